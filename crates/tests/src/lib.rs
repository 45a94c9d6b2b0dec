//! # Integration Tests
//!
//! End-to-end tests for the streaming pipeline.
//!
//! Covers:
//! - Configuration loading round-trips
//! - Full source -> filter -> batch -> serialize -> dispatch runs
//! - Multi-worker event slicing

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    const FULL_TOML: &str = r#"
        [streamer]
        source_identifier = "detector0"
        batch_size = 4
        max_consecutive_incomplete = 10

        [event_source]
        type = "internal"
        number_of_events = 20

        [data_sources.detector]
        type = "random_array"
        shape = [16, 16]
        element_type = "float"
        missing_every = 7

        [data_sources.timestamp]
        type = "timestamp"

        [preprocessing]
        pad_height = 32
        pad_width = 32
        pad_style = "center"
        add_channel_axis = true

        [serializer]
        format = "json"

        [[sinks]]
        name = "log"
        type = "log"

        [[sinks]]
        name = "files"
        type = "file"
        write_directory = "/tmp/detstream"
        file_prefix = "run42"
    "#;

    #[test]
    fn test_full_config_loads_and_round_trips() {
        let config = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(config.streamer.batch_size, 4);
        assert_eq!(config.data_sources.len(), 2);
        assert_eq!(config.sinks.len(), 2);

        // TOML -> struct -> JSON -> struct preserves the configuration
        let json = ConfigLoader::to_json(&config).unwrap();
        let reloaded = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(reloaded.streamer.source_identifier, "detector0");
        assert_eq!(reloaded.sinks[1].name, "files");
    }
}

#[cfg(test)]
mod e2e_tests {
    use contracts::{Batch, Serializer, StreamerConfig};
    use dispatcher::SinkGroup;
    use batch_engine::{BatchingStage, Preprocessor};
    use event_source::{EventSource, FilterOutcome, IncompleteEventFilter, InternalEventSource};
    use observability::RateClock;
    use serializers::JsonSerializer;

    fn pipeline_config(write_directory: &std::path::Path) -> StreamerConfig {
        let toml = format!(
            r#"
            [streamer]
            source_identifier = "e2e"
            batch_size = 4

            [event_source]
            type = "internal"
            number_of_events = 10

            [data_sources.detector]
            type = "random_array"
            shape = [6, 4]
            element_type = "float"

            [data_sources.counts]
            type = "random_array"
            shape = [3]
            element_type = "int"

            [data_sources.timestamp]
            type = "timestamp"

            [preprocessing]
            pad_height = 8
            pad_width = 8
            add_channel_axis = true

            [serializer]
            format = "json"

            [[sinks]]
            name = "log"
            type = "log"

            [[sinks]]
            name = "files"
            type = "file"
            write_directory = "{}"
            file_prefix = "run"
            file_suffix = "json"
            "#,
            write_directory.display()
        );
        config_loader::ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml)
            .unwrap()
    }

    /// End-to-end: InternalEventSource -> filter -> batching -> JSON -> sinks
    #[tokio::test]
    async fn test_e2e_pipeline_writes_all_batches() {
        let dir = tempfile::tempdir().unwrap();
        let config = pipeline_config(dir.path());

        let mut source = InternalEventSource::from_config(
            &config.event_source,
            &config.data_sources,
            1,
            0,
        )
        .unwrap()
        .with_seed(7);
        let mut filter =
            IncompleteEventFilter::new(config.streamer.max_consecutive_incomplete);
        let preprocessor = config.preprocessing.as_ref().map(Preprocessor::from_config);
        let mut stage = BatchingStage::new(config.streamer.batch_size, preprocessor);
        let serializer = JsonSerializer;
        let mut sinks = SinkGroup::open(&config.sinks, 0).await.unwrap();

        let mut batches = Vec::new();
        while let Some(event) = source.next_event().await.unwrap() {
            match filter.offer(event) {
                FilterOutcome::Pass(event) => {
                    if let Some(batch) = stage.push(event).unwrap() {
                        batches.push(batch);
                    }
                }
                FilterOutcome::Dropped => {}
                FilterOutcome::Halt => break,
            }
        }
        if let Some(batch) = stage.finish().unwrap() {
            batches.push(batch);
        }

        let mut clock = RateClock::new();
        for batch in &batches {
            let block = serializer.serialize(batch).unwrap();
            sinks.dispatch(&block).await.unwrap();
            clock.tick(block.len() as u64);
        }
        sinks.close_all().await.unwrap();

        let rate = clock.state();
        assert_eq!(rate.count, 3);
        assert!(rate.bytes > 0);

        // 10 events at batch size 4: sizes 4, 4, 2
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);

        // Every block landed on disk and parses back into a batch
        for counter in 0..3 {
            let path = dir.path().join(format!("run_r0_{counter}.json"));
            let bytes = std::fs::read(&path).unwrap();
            let decoded: Batch = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(decoded.len(), sizes[counter]);

            // Padded and channel-expanded: (B, 1, 8, 8)
            let detector = decoded.fields.get("detector").unwrap();
            assert_eq!(detector.shape(), &[sizes[counter], 1, 8, 8]);

            let counts = decoded.fields.get("counts").unwrap();
            assert_eq!(counts.shape(), &[sizes[counter], 3]);
        }
        assert!(!dir.path().join("run_r0_3.json").exists());

        let summary = filter.summary();
        assert_eq!(summary.events_seen, 10);
        assert_eq!(summary.events_dropped, 0);
        assert!(!summary.early_stop);
    }

    /// Workers with distinct ranks consume disjoint slices of the run
    #[tokio::test]
    async fn test_e2e_workers_split_the_event_stream() {
        let dir = tempfile::tempdir().unwrap();
        let config = pipeline_config(dir.path());
        let world_size = 3;

        let mut per_worker = Vec::new();
        for rank in 0..world_size {
            let mut source = InternalEventSource::from_config(
                &config.event_source,
                &config.data_sources,
                world_size,
                rank,
            )
            .unwrap()
            .with_seed(rank);

            let mut count = 0u64;
            while let Some(event) = source.next_event().await.unwrap() {
                assert!(event.is_complete());
                count += 1;
            }
            per_worker.push(count);
        }

        // 10 events over 3 workers: ranks 0,1,2 get 4,3,3
        assert_eq!(per_worker, vec![4, 3, 3]);
    }

    /// A source with a periodically missing field drops events but finishes
    #[tokio::test]
    async fn test_e2e_incomplete_events_are_dropped_not_fatal() {
        let toml = r#"
            [streamer]
            source_identifier = "e2e"
            batch_size = 3
            max_consecutive_incomplete = 5

            [event_source]
            type = "internal"
            number_of_events = 12

            [data_sources.detector]
            type = "random_array"
            shape = [4]
            element_type = "float"
            missing_every = 4

            [serializer]
            format = "json"

            [[sinks]]
            name = "log"
            type = "log"
        "#;
        let config =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        let mut source = InternalEventSource::from_config(
            &config.event_source,
            &config.data_sources,
            1,
            0,
        )
        .unwrap()
        .with_seed(3);
        let mut filter =
            IncompleteEventFilter::new(config.streamer.max_consecutive_incomplete);
        let mut stage = BatchingStage::new(config.streamer.batch_size, None);

        let mut processed = 0u64;
        while let Some(event) = source.next_event().await.unwrap() {
            match filter.offer(event) {
                FilterOutcome::Pass(event) => {
                    stage.push(event).unwrap();
                    processed += 1;
                }
                FilterOutcome::Dropped => {}
                FilterOutcome::Halt => panic!("sparse drops must not trigger early stop"),
            }
        }

        // Events 4 and 8 are missing the detector field
        let summary = filter.summary();
        assert_eq!(summary.events_seen, 12);
        assert_eq!(summary.events_dropped, 2);
        assert_eq!(summary.dropped_per_field.get("detector"), Some(&2));
        assert_eq!(processed, 10);
    }
}
