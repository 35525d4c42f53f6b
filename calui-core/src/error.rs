//! Error types for calui.

use thiserror::Error;

/// Errors that can occur in calui operations.
#[derive(Error, Debug)]
pub enum CalUiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown modal type '{0}'. Expected one of: event, task, appointment")]
    UnknownModalType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CalUiError {
    fn from(err: serde_json::Error) -> Self {
        CalUiError::Serialization(err.to_string())
    }
}

/// Result type alias for calui operations.
pub type CalUiResult<T> = Result<T, CalUiError>;
