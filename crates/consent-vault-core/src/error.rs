//! Error types for the Consent Vault Core.

use thiserror::Error;

/// Core errors raised while constructing primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A required identifier or argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A hex-encoded identifier could not be parsed.
    #[error("malformed identifier: {0}")]
    MalformedId(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
