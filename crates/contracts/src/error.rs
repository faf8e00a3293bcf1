//! Layered error definitions
//!
//! Categorized by origin: config / acquisition / sink.
//! None of these cover event-timing conditions inside the buffer - those
//! are diagnostics, not errors, and the engine keeps running through them.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
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

    // ===== Acquisition Errors =====
    /// Source construction or fetch-side failure
    #[error("acquisition error for source '{source_id}': {message}")]
    Acquisition { source_id: String, message: String },

    /// Recording file problem
    #[error("replay error for '{path}': {message}")]
    Replay { path: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
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

    /// Create acquisition error
    pub fn acquisition(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Acquisition {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create replay error
    pub fn replay(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Replay {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
