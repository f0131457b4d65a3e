//! Storage error types.

use thiserror::Error;

/// Storage-specific errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to open or create the database.
    #[error("failed to open storage: {0}")]
    Open(String),

    /// Migration execution failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// Serialization/deserialization of a stored value failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Input rejected at the storage boundary; nothing was written.
    #[error("validation error: {0}")]
    Validation(String),

    /// Underlying `SQLx` error.
    #[error("storage error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error during storage operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;
