//! Cull Storage Layer
//!
//! Provides `SQLite` persistence for the retention engine's state: the
//! whitelist and graylist, expression rules, settings, the snapshot cache,
//! and the cleanup log. Uses `SQLx` with embedded migrations.
//!
//! # Architecture
//!
//! - **Key/value schema**: all state lives in a single `kv` table keyed by
//!   well-known names (`whiteList`, `grayList`, `expressions`, `settings`,
//!   `cachedCookies`, `lastUpdateTime`, `cleanupLogs`), each value a JSON
//!   document
//! - **Write serialization**: every read-modify-write cycle runs under a
//!   shared write lock, so concurrent mutations never lose updates
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//!
//! # Example
//!
//! ```ignore
//! use cull_store::{Storage, migrations, lists};
//! use cull_core::{CookieId, ListType};
//!
//! let storage = Storage::open("cull.db").await?;
//! migrations::run_migrations(storage.pool()).await?;
//! let id = CookieId::parse("example.com:session")?;
//! lists::add(&storage, &id, ListType::Whitelist).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod expressions;
pub mod kv;
pub mod lists;
pub mod log;
pub mod migrations;
pub mod settings;
pub mod snapshot;

pub use connection::Storage;
pub use error::{Result, StoreError};
pub use lists::AddOutcome;
pub use snapshot::SnapshotCache;

/// An in-memory `Storage` with migrations applied, for tests.
#[cfg(test)]
pub(crate) async fn test_storage() -> Storage {
    let storage = Storage::in_memory().await.expect("open in-memory storage");
    migrations::run_migrations(storage.pool())
        .await
        .expect("run migrations");
    storage
}
