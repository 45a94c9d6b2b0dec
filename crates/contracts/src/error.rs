//! Layered error definitions
//!
//! Categorized by source: config / batch schema / serializer / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum StreamerError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Batch Schema Errors =====
    /// A field was absent in the very first event of a batch
    #[error("field '{field}' absent in first event: baseline shape cannot be established")]
    FirstEventIncomplete { field: String },

    /// Event key set diverged from the established field set
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Array shape diverged from the field baseline
    #[error("shape mismatch for field '{field}': expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        field: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Element type diverged from the field baseline
    #[error("type mismatch for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: crate::ElementType,
        actual: crate::ElementType,
    },

    // ===== Serializer Errors =====
    /// Batch serialization error
    #[error("serializer '{serializer}' error: {message}")]
    Serialize { serializer: String, message: String },

    // ===== Sink Errors =====
    /// Sink open error
    #[error("sink '{sink_name}' open error: {message}")]
    SinkOpen { sink_name: String, message: String },

    /// Sink send error
    #[error("sink '{sink_name}' send error: {message}")]
    SinkSend { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl StreamerError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create schema mismatch error
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    /// Create serializer error
    pub fn serialize(serializer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialize {
            serializer: serializer.into(),
            message: message.into(),
        }
    }

    /// Create sink open error
    pub fn sink_open(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkOpen {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink send error
    pub fn sink_send(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkSend {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
