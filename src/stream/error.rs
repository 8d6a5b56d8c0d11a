use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while building streamgraph bands
#[derive(Debug, Error)]
pub enum StreamError {
    /// Malformed input: wrong shape, unsupported x type, negative value or pad,
    /// duplicate observations, or an unusable interpolation resolution
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure while assembling an output DataFrame
    #[error("DataFrame error: {0}")]
    Polars(#[from] PolarsError),

    /// Failure while serializing records
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StreamError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        StreamError::InvalidInput(message.into())
    }
}

/// Type alias for Results using StreamError
pub type Result<T> = std::result::Result<T, StreamError>;
