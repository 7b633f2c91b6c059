//! Error types used across backingfiles provisioning.

use thiserror::Error;

/// Result type for backingfiles operations.
pub type BackingfilesResult<T> = Result<T, BackingfilesError>;

#[derive(Debug, Error)]
pub enum BackingfilesError {
    /// Size request matching none of the recognized forms.
    #[error("unsupported value: {0}")]
    UnsupportedSize(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// External disk tool failed to start or exited non-zero.
    #[error("tool error: {0}")]
    Tool(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),
}

// Implement From for common error types to enable `?` operator
impl From<std::io::Error> for BackingfilesError {
    fn from(err: std::io::Error) -> Self {
        BackingfilesError::Internal(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for BackingfilesError {
    fn from(err: serde_json::Error) -> Self {
        BackingfilesError::Config(format!("JSON error: {}", err))
    }
}

impl From<String> for BackingfilesError {
    fn from(err: String) -> Self {
        BackingfilesError::Internal(err)
    }
}

impl From<&str> for BackingfilesError {
    fn from(err: &str) -> Self {
        BackingfilesError::Internal(err.to_string())
    }
}
