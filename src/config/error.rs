//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid API base URL: {0}")]
    InvalidApiUrl(String),

    #[error("Invalid realtime URL: {0}")]
    InvalidRealtimeUrl(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Reconnect interval must be positive when reconnect is enabled")]
    InvalidReconnectInterval,
}
