//! # Errors
//!
//! Typed failures of the controller runtime. The state store itself is
//! infallible; these cover configuration, metrics registration and serving.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration '{value}' for {key}: expected <number><unit> with unit s, m, h or d")]
    InvalidDuration { key: String, value: String },

    #[error("duration for {key} must be greater than 0, got '{value}'")]
    ZeroDuration { key: String, value: String },

    #[error(
        "renewal overdue window ({overdue_secs}s) must not exceed the renewal window ({renewal_secs}s)"
    )]
    OverdueExceedsRenewal { overdue_secs: u64, renewal_secs: u64 },

    #[error("{key} must be greater than 0")]
    MustBePositive { key: &'static str },
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("metrics registration failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),
}
