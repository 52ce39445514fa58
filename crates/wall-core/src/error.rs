//! Error types for wall-core

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias using wall-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in wall-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-success response from the hosted store
    #[error("Store API error: {0}")]
    Api(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Realtime channel error
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Clipboard access error
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Realtime(error.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        Self::InvalidConfiguration(error.to_string())
    }
}
