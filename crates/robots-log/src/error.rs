//! Error types for the log store

use thiserror::Error;

/// Errors raised while building a store from its configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Capacity must be positive, got 0")]
    ZeroCapacity,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the low-level range accessor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Invalid range [{from}, {to}) for store of size {size}")]
    OutOfBounds { from: usize, to: usize, size: usize },
}
