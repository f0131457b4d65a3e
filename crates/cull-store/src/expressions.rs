//! Domain expression storage.
//!
//! Expressions live as one JSON array under the `expressions` key.
//! `upsert` replaces by id, so editing an expression in place keeps its
//! identity stable.

use crate::connection::Storage;
use crate::error::{Result, StoreError};
use crate::kv;
use cull_core::Expression;

const KEY: &str = "expressions";

/// Insert a new expression or replace the one sharing its id.
///
/// # Errors
/// Returns `StoreError::Validation` for an empty pattern; nothing is
/// written in that case.
pub async fn upsert(storage: &Storage, expression: Expression) -> Result<()> {
    if expression.domain_pattern.trim().is_empty() {
        return Err(StoreError::Validation(
            "expression pattern must not be empty".to_string(),
        ));
    }

    let _guard = storage.lock_writes().await;

    let mut expressions = read(storage).await?;
    if let Some(existing) = expressions.iter_mut().find(|e| e.id == expression.id) {
        *existing = expression;
    } else {
        expressions.push(expression);
    }
    write(storage, &expressions).await?;
    Ok(())
}

/// Delete an expression by id. Returns true if an expression was removed.
pub async fn delete(storage: &Storage, id: &str) -> Result<bool> {
    let _guard = storage.lock_writes().await;

    let mut expressions = read(storage).await?;
    let before = expressions.len();
    expressions.retain(|e| e.id != id);

    if expressions.len() == before {
        return Ok(false);
    }
    write(storage, &expressions).await?;
    Ok(true)
}

/// Load all expressions.
pub async fn load(storage: &Storage) -> Result<Vec<Expression>> {
    read(storage).await
}

async fn read(storage: &Storage) -> Result<Vec<Expression>> {
    match kv::get(storage.pool(), KEY).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

async fn write(storage: &Storage, expressions: &[Expression]) -> Result<()> {
    let value =
        serde_json::to_value(expressions).map_err(|e| StoreError::Serialization(e.to_string()))?;
    kv::set(storage.pool(), KEY, &value).await
}
