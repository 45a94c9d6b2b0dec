//! EventSource trait - event acquisition interface
//!
//! An event source produces a lazy, finite, non-restartable sequence of
//! events. How the sequence is produced (facility framework, replay,
//! synthetic generation) is opaque to the pipeline.

use contracts::{Event, StreamerError};

/// Event acquisition trait
#[trait_variant::make(EventSource: Send)]
pub trait LocalEventSource {
    /// Retrieve the next event, or `None` on exhaustion
    ///
    /// Once `None` is returned the sequence must not be restarted.
    async fn next_event(&mut self) -> Result<Option<Event>, StreamerError>;
}
