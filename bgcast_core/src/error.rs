//! Error types for the bgcast_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for bgcast_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A numeric input was out of its valid domain (zero/negative ratio, TDD, etc.)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Reject values that are non-finite or not strictly positive
pub(crate) fn require_positive(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

/// Reject values that are non-finite or negative
pub(crate) fn require_non_negative(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter(format!(
            "{} must be zero or greater, got {}",
            name, value
        )))
    }
}
