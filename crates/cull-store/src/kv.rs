//! Raw key/value access.
//!
//! Every persisted engine concern is one JSON value under one key in the
//! `kv` table. The typed stores in this crate are thin layers over these
//! three functions.

use crate::error::{Result, StoreError};
use serde_json::Value;
use sqlx::SqlitePool;

/// Set a value, inserting or overwriting the key.
pub async fn set(pool: &SqlitePool, key: &str, value: &Value) -> Result<()> {
    let value_str =
        serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;

    sqlx::query(
        r"
        INSERT INTO kv (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        ",
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(())
}

/// Set several keys in one transaction.
///
/// Either every key is written or none is; readers never observe a
/// subset of the batch.
pub async fn set_many(pool: &SqlitePool, pairs: &[(&str, Value)]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (key, value) in pairs {
        let value_str =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value_str)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Get a value, or `None` when the key is absent.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as(
        r"
        SELECT value
        FROM kv
        WHERE key = ?
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((value_str,)) => {
            let value: Value = serde_json::from_str(&value_str)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Delete a key. Deleting an absent key is a no-op.
pub async fn delete(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query(
        r"
        DELETE FROM kv
        WHERE key = ?
        ",
    )
    .bind(key)
    .execute(pool)
    .await?;

    Ok(())
}
