//! Pipeline error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the pipeline coordinator
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration rejected before any worker was launched
    #[error("invalid configuration: {field} {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    /// The buffer closed while the run was still in progress
    #[error("buffer closed while the pipeline was running")]
    BufferClosed,
}

impl PipelineError {
    pub(crate) fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}

/// Errors fatal to a single reader worker
///
/// A reader failure never propagates to its peers; the coordinator's
/// terminal report reflects whatever the failed reader produced before it
/// stopped.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Stream-level I/O failure on an input
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Buffer closed while records remained in the input
    #[error("buffer closed while records remained")]
    BufferClosed,
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
