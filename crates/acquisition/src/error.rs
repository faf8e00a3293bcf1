//! Acquisition error types

use std::path::PathBuf;

use thiserror::Error;

/// Acquisition-specific errors
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Source configuration cannot be turned into a runtime source
    #[error("invalid source '{source_id}': {message}")]
    InvalidSource { source_id: String, message: String },

    /// Recording file missing or malformed
    #[error("failed to load recording {path}: {message}")]
    RecordingLoad { path: PathBuf, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquisitionError {
    pub fn invalid_source(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSource {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    pub fn recording_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RecordingLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
