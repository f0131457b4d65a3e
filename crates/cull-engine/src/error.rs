//! Error types for the cull engine.

use cull_platform::PlatformError;
use cull_store::StoreError;
use thiserror::Error;

/// Errors produced while scheduling and running cleanups.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The platform cookie store failed
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Persisted storage failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Boundary input was rejected
    #[error("validation error: {0}")]
    Validation(String),

    /// The engine's trigger queue is no longer accepting messages
    #[error("engine stopped")]
    Stopped,
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
