//! ByteSink trait - SinkGroup output interface
//!
//! Defines the abstract lifecycle contract for sinks: a sink is opened by its
//! constructor, receives serialized blocks via `send`, and must be closed
//! exactly once on every exit path.

use crate::StreamerError;

/// An opaque, already-serialized payload; the unit of sink dispatch
pub type ByteBlock = bytes::Bytes;

/// Byte-block output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(ByteSink: Send)]
pub trait LocalByteSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Send one serialized block
    ///
    /// At-most-once delivery: a failed send is never retried by the caller.
    ///
    /// # Errors
    /// Returns send error (should include context)
    async fn send(&mut self, block: &ByteBlock) -> Result<(), StreamerError>;

    /// Close the sink, releasing its resource
    async fn close(&mut self) -> Result<(), StreamerError>;
}
