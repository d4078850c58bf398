//! Errors raised by component code itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Teardown failed: {0}")]
    DisposeFailed(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

impl From<String> for ComponentError {
    fn from(message: String) -> Self {
        ComponentError::Custom(message)
    }
}

impl From<&str> for ComponentError {
    fn from(message: &str) -> Self {
        ComponentError::Custom(message.to_string())
    }
}
