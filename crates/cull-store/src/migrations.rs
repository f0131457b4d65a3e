//! Storage migration management.
//!
//! Embeds SQL migrations and applies them automatically via `SQLx`'s
//! built-in migration support.

use crate::error::{Result, StoreError};
use sqlx::{Pool, Sqlite};

/// Run all pending storage migrations.
///
/// # Errors
/// Returns `StoreError::Migration` if any migration fails to execute.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    tracing::info!("Running storage migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(format!("migration execution failed: {e}")))?;

    tracing::info!("Storage migrations completed");
    Ok(())
}

/// Get the current schema version (the highest applied migration number,
/// 0 when none have run).
///
/// # Errors
/// Returns `StoreError` if the migrations table cannot be queried.
pub async fn get_schema_version(pool: &Pool<Sqlite>) -> Result<i64> {
    let table_exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?
        > 0;

    if !table_exists {
        return Ok(0);
    }

    let version =
        sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(version), 0) FROM _sqlx_migrations")
            .fetch_optional(pool)
            .await?
            .unwrap_or(0);

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Storage;

    #[tokio::test]
    async fn test_run_migrations() {
        let storage = Storage::in_memory().await.expect("create storage");
        run_migrations(storage.pool()).await.expect("run migrations");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name"
        )
        .fetch_all(storage.pool())
        .await
        .expect("query tables");

        assert_eq!(tables, vec!["kv"]);
    }

    #[tokio::test]
    async fn test_get_schema_version() {
        let storage = Storage::in_memory().await.expect("create storage");

        let version = get_schema_version(storage.pool())
            .await
            .expect("get version");
        assert_eq!(version, 0);

        run_migrations(storage.pool()).await.expect("run migrations");

        let version = get_schema_version(storage.pool())
            .await
            .expect("get version");
        assert_eq!(version, 1);
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let storage = Storage::in_memory().await.expect("create storage");

        run_migrations(storage.pool())
            .await
            .expect("first migration run");
        run_migrations(storage.pool())
            .await
            .expect("second migration run should be idempotent");
    }
}
