//! Error types for the data generators

use thiserror::Error;

/// Errors that can occur while generating an artifact
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Capacity exceeded: {what} = {value} > {max}")]
    Capacity {
        what: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Invalid dimensions: lsize={lsize}, rsize={rsize} (both must be positive)")]
    InvalidDimensions { lsize: usize, rsize: usize },

    #[error("Malformed artifact: {0}")]
    MalformedArtifact(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// Shorthand for an out-of-range error rate
    pub fn invalid_error_rate(error_rate: f64) -> Self {
        GenError::Configuration(format!(
            "error rate {error_rate} must be in the open interval (0, 1)"
        ))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GenError>;
