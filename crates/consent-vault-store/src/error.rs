//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Entry serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid data in storage or an invalid argument to it.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding the backend was poisoned.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
