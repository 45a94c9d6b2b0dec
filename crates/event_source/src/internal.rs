//! InternalEventSource - framework-free synthetic event source
//!
//! Generates events from the configured data source definitions without any
//! external acquisition framework. Intended for testing and for exercising
//! the full pipeline end to end. Workers share a global event index range:
//! worker `rank` takes indices where `index % world_size == rank`.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use contracts::{DataSourceConfig, Event, EventSourceConfig, StreamerError};

use crate::{DataSource, EventSource};

/// Synthetic event source with per-rank event slicing
pub struct InternalEventSource {
    data_sources: BTreeMap<String, DataSource>,
    number_of_events: u64,
    world_size: u64,
    rank: u64,
    next_index: u64,
    rng: StdRng,
}

impl InternalEventSource {
    /// Build from validated configuration
    ///
    /// # Errors
    /// Returns `ConfigValidation` when the rank is outside the worker pool.
    pub fn from_config(
        event_source: &EventSourceConfig,
        data_sources: &BTreeMap<String, DataSourceConfig>,
        world_size: u64,
        rank: u64,
    ) -> Result<Self, StreamerError> {
        if world_size == 0 || rank >= world_size {
            return Err(StreamerError::config_validation(
                "rank",
                format!("rank {rank} is outside worker pool of size {world_size}"),
            ));
        }
        let EventSourceConfig::Internal { number_of_events } = event_source;

        let data_sources = data_sources
            .iter()
            .map(|(name, config)| (name.clone(), DataSource::from_config(config)))
            .collect();

        Ok(Self {
            data_sources,
            number_of_events: *number_of_events,
            world_size,
            rank,
            next_index: rank,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Fixed-seed variant for deterministic tests
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }
}

impl EventSource for InternalEventSource {
    async fn next_event(&mut self) -> Result<Option<Event>, StreamerError> {
        if self.next_index >= self.number_of_events {
            return Ok(None);
        }
        let index = self.next_index;
        self.next_index += self.world_size;

        let mut event = Event::new();
        for (name, source) in &self.data_sources {
            event.insert(name.clone(), source.generate(&mut self.rng, index));
        }
        debug!(event_index = index, rank = self.rank, "Event generated");
        Ok(Some(event))
    }
}
