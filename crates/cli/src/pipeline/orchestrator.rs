//! Pipeline orchestrator - coordinates all components.
//!
//! One pipeline per worker process: events are consumed, filtered, batched,
//! serialized, and dispatched in a single cooperative loop. Sinks are opened
//! before the first event and closed after the last block, on error paths
//! included.

use std::time::Instant;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

use batch_engine::{BatchingStage, Preprocessor};
use contracts::{Batch, Serializer, StreamerConfig};
use dispatcher::SinkGroup;
use event_source::{EventSource, FilterOutcome, IncompleteEventFilter, InternalEventSource};
use observability::RateClock;
use serializers::create_serializer;

use crate::error::CliError;

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The full streamer configuration
    pub streamer_config: StreamerConfig,

    /// Maximum number of events to consume (None = source decides)
    pub max_events: Option<u64>,

    /// This worker's rank within the pool
    pub rank: u64,

    /// Total number of workers in the pool
    pub world_size: u64,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// `shutdown` is checked between items: when it flips to true, the
    /// in-flight dispatch finishes, the partial batch is flushed, the filter
    /// summary is logged, and sinks are closed before the stats are returned.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let PipelineConfig {
            streamer_config,
            max_events,
            rank,
            world_size,
            metrics_port,
        } = self.config;

        if let Some(port) = metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let mut source = InternalEventSource::from_config(
            &streamer_config.event_source,
            &streamer_config.data_sources,
            world_size,
            rank,
        )?;
        let mut filter =
            IncompleteEventFilter::new(streamer_config.streamer.max_consecutive_incomplete);
        let preprocessor = streamer_config
            .preprocessing
            .as_ref()
            .map(Preprocessor::from_config);
        let mut stage = BatchingStage::new(streamer_config.streamer.batch_size, preprocessor);
        let serializer = create_serializer(streamer_config.serializer);

        // Sinks are opened before the first event is consumed
        let mut sinks = SinkGroup::open(&streamer_config.sinks, rank).await?;
        let mut clock = RateClock::new();

        let mut stats = PipelineStats {
            active_sinks: sinks.len(),
            ..Default::default()
        };

        info!(
            rank,
            world_size,
            batch_size = streamer_config.streamer.batch_size,
            sinks = sinks.len(),
            "Pipeline components ready"
        );

        let result = stream_events(
            &mut source,
            &mut filter,
            &mut stage,
            serializer.as_ref(),
            &mut sinks,
            &mut clock,
            &mut stats,
            max_events,
            &shutdown,
        )
        .await;

        let summary = filter.log_summary();
        stats.events_seen = summary.events_seen;
        stats.events_dropped = summary.events_dropped;
        stats.dropped_per_field = summary.dropped_per_field;
        stats.early_stop = summary.early_stop;

        // Sinks close even when the loop failed
        let close_result = sinks.close_all().await;
        stats.duration = start_time.elapsed();

        result?;
        close_result?;

        Ok(stats)
    }
}

/// Consume the source until exhaustion, limit, early stop, or shutdown
#[allow(clippy::too_many_arguments)]
async fn stream_events(
    source: &mut InternalEventSource,
    filter: &mut IncompleteEventFilter,
    stage: &mut BatchingStage,
    serializer: &dyn Serializer,
    sinks: &mut SinkGroup,
    clock: &mut RateClock,
    stats: &mut PipelineStats,
    max_events: Option<u64>,
    shutdown: &watch::Receiver<bool>,
) -> Result<()> {
    let mut consumed = 0u64;

    loop {
        if *shutdown.borrow() {
            info!("Shutdown requested, flushing and closing");
            break;
        }

        if let Some(limit) = max_events {
            if consumed >= limit {
                info!(limit, "Event limit reached");
                break;
            }
        }

        let Some(event) = source.next_event().await? else {
            break;
        };
        consumed += 1;

        match filter.offer(event) {
            FilterOutcome::Pass(event) => {
                stats.events_processed += 1;
                if let Some(batch) = stage.push(event)? {
                    ship_batch(&batch, serializer, sinks, clock, stats).await?;
                }
            }
            FilterOutcome::Dropped => {}
            FilterOutcome::Halt => {
                warn!("Consecutive incomplete limit reached, stopping early");
                break;
            }
        }
    }

    // Flush the final partial batch
    if let Some(batch) = stage.finish()? {
        ship_batch(&batch, serializer, sinks, clock, stats).await?;
    }

    Ok(())
}

/// Serialize one batch and fan it out to every sink
async fn ship_batch(
    batch: &Batch,
    serializer: &dyn Serializer,
    sinks: &mut SinkGroup,
    clock: &mut RateClock,
    stats: &mut PipelineStats,
) -> Result<()> {
    let block = serializer.serialize(batch)?;
    let bytes = block.len() as u64;

    sinks
        .dispatch(&block)
        .await
        .map_err(|e| CliError::pipeline_execution(e.to_string()))?;

    let state = clock.tick(bytes);
    stats.batches_dispatched += 1;
    stats.bytes_dispatched += bytes;

    info!(events = batch.len(), bytes, rate = %state, "Batch dispatched");
    Ok(())
}
