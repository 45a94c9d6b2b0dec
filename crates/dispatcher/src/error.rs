//! Dispatcher error types

use thiserror::Error;

/// One failed send within a fan-out
#[derive(Debug, Clone)]
pub struct SinkFailure {
    /// Name of the failing sink
    pub sink: String,
    /// Underlying error message
    pub message: String,
}

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink open error (startup, before any event is consumed)
    #[error("failed to open sink '{name}': {message}")]
    SinkOpen { name: String, message: String },

    /// One or more sends failed for a single block
    ///
    /// Raised only after every concurrent send for the block has finished;
    /// successful sinks are not retried or rolled back.
    #[error("dispatch failed for sink(s): {}", format_failures(.failures))]
    Fanout { failures: Vec<SinkFailure> },
}

impl DispatcherError {
    /// Create a sink open error
    pub fn sink_open(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkOpen {
            name: name.into(),
            message: message.into(),
        }
    }
}

fn format_failures(failures: &[SinkFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.sink, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}
