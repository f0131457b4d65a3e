//! Storage connection management.
//!
//! Wraps a `SQLx` SQLite pool together with the write lock that serializes
//! read-modify-write cycles against the key/value table.

use crate::error::{Result, StoreError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Persisted storage handle.
///
/// Cheap to clone: the pool is internally reference-counted and the write
/// lock is shared across clones, so every writer in the process contends
/// on the same lock.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
    write_lock: Arc<Mutex<()>>,
}

impl Storage {
    /// Open (or create) a storage database at the given path.
    ///
    /// # Errors
    /// Returns `StoreError::Open` if the database cannot be opened.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path
            .as_ref()
            .to_str()
            .ok_or_else(|| StoreError::Open("invalid storage path: not valid UTF-8".to_string()))?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Open(format!("failed to initialize pool: {e}")))?;

        tracing::info!("Storage pool created at {}", path_str);

        Ok(Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Open an in-memory storage database.
    ///
    /// In-memory SQLite databases are per-connection, so the pool is
    /// capped at a single connection.
    pub async fn in_memory() -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(":memory:")
            .map_err(|e| StoreError::Open(format!("invalid connection string: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::Open(format!("failed to initialize pool: {e}")))?;

        Ok(Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Acquire the process-wide write lock.
    ///
    /// Every read-modify-write against the key/value table must hold this
    /// guard for its whole read-through-write cycle; otherwise two
    /// concurrent writers can both read the same stale value and the last
    /// write wins.
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Storage pool closed");
    }

    /// Verify that the database is reachable.
    ///
    /// # Errors
    /// Returns `StoreError` if a trivial query fails.
    pub async fn verify(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
