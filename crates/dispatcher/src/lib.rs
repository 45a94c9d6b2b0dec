//! # Dispatcher
//!
//! Byte-block distribution module.
//!
//! Responsibilities:
//! - Own the configured sinks for the pipeline's lifetime
//! - Fan out each block to every sink concurrently, one item at a time
//! - Open sinks fail-fast in configuration order, close in reverse order

pub mod error;
pub mod metrics;
pub mod sink_group;
pub mod sinks;

pub use contracts::{ByteBlock, ByteSink};
pub use error::{DispatcherError, SinkFailure};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sink_group::{Sink, SinkGroup};
pub use sinks::{FileSink, LogSink, NetworkSink};
