//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Command prefix and name cannot both be empty")]
    EmptyTrigger,

    #[error("Reply timeout must be between 1 and 3600 seconds")]
    InvalidReplyTimeout,

    #[error("Concurrent command limit must be greater than zero")]
    InvalidConcurrencyLimit,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogFilter(String),
}
