//! Streaming Pipeline Demo
//!
//! Assembles the pipeline stages by hand instead of going through the CLI:
//! internal event source -> incomplete-event filter -> batching stage ->
//! JSON serializer -> sink group. Runs entirely in-process with a log sink.
//!
//! Run with: cargo run --bin streaming_pipeline [config.toml]

use batch_engine::{BatchingStage, Preprocessor};
use config_loader::{ConfigFormat, ConfigLoader};
use contracts::StreamerConfig;
use dispatcher::SinkGroup;
use event_source::{EventSource, FilterOutcome, IncompleteEventFilter, InternalEventSource};
use observability::RateClock;
use serializers::create_serializer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Streaming Pipeline Demo");

    // ==== Stage 1: Use default config or load from file ====
    let config = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading streamer config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        demo_config()?
    };

    // ==== Stage 2: Build pipeline stages ====
    let mut source =
        InternalEventSource::from_config(&config.event_source, &config.data_sources, 1, 0)?;
    let mut filter = IncompleteEventFilter::new(config.streamer.max_consecutive_incomplete);
    let preprocessor = config.preprocessing.as_ref().map(Preprocessor::from_config);
    let mut stage = BatchingStage::new(config.streamer.batch_size, preprocessor);
    let serializer = create_serializer(config.serializer);

    // ==== Stage 3: Open sinks ====
    let mut sinks = SinkGroup::open(&config.sinks, 0).await?;
    let mut clock = RateClock::new();
    tracing::info!(sinks = sinks.len(), "Sinks open, streaming events");

    // ==== Stage 4: Stream ====
    while let Some(event) = source.next_event().await? {
        match filter.offer(event) {
            FilterOutcome::Pass(event) => {
                if let Some(batch) = stage.push(event)? {
                    let block = serializer.serialize(&batch)?;
                    sinks.dispatch(&block).await?;
                    let state = clock.tick(block.len() as u64);
                    tracing::info!(events = batch.len(), rate = %state, "Batch dispatched");
                }
            }
            FilterOutcome::Dropped => {}
            FilterOutcome::Halt => {
                tracing::warn!("Too many consecutive incomplete events, stopping");
                break;
            }
        }
    }

    // Flush the final partial batch
    if let Some(batch) = stage.finish()? {
        let block = serializer.serialize(&batch)?;
        sinks.dispatch(&block).await?;
        clock.tick(block.len() as u64);
    }

    // ==== Stage 5: Shut down ====
    let summary = filter.log_summary();
    sinks.close_all().await?;

    tracing::info!(
        events = summary.events_seen,
        dropped = summary.events_dropped,
        rate = %clock.state(),
        "Demo finished"
    );

    Ok(())
}

/// Minimal in-process configuration: one detector field plus a timestamp
fn demo_config() -> Result<StreamerConfig, contracts::StreamerError> {
    let toml = r#"
        [streamer]
        source_identifier = "demo"
        batch_size = 8

        [event_source]
        type = "internal"
        number_of_events = 64

        [data_sources.detector]
        type = "random_array"
        shape = [32, 32]
        element_type = "float"
        missing_every = 10

        [data_sources.timestamp]
        type = "timestamp"

        [serializer]
        format = "json"

        [[sinks]]
        name = "log"
        type = "log"
    "#;
    ConfigLoader::load_from_str(toml, ConfigFormat::Toml)
}
