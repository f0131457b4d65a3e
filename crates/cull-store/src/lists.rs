//! Whitelist/graylist entry storage.
//!
//! Each list is a JSON array of cookie-id strings under its own key
//! (`whiteList` / `grayList`). Mutations are read-modify-write cycles and
//! therefore run under the storage write lock.

use crate::connection::Storage;
use crate::error::{Result, StoreError};
use crate::kv;
use cull_core::{CookieId, ListSnapshot, ListType};
use std::collections::HashSet;

/// Outcome of an insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The id was appended and persisted
    Added,
    /// The id was already on the list; nothing was written
    AlreadyPresent,
}

/// Add a cookie id to a list.
///
/// Duplicate insertion is rejected as a no-op and reported as
/// [`AddOutcome::AlreadyPresent`]. No exclusivity across lists is
/// enforced; an id may sit on both, and evaluation precedence handles it.
pub async fn add(storage: &Storage, id: &CookieId, list_type: ListType) -> Result<AddOutcome> {
    let _guard = storage.lock_writes().await;

    let mut entries = read_entries(storage, list_type).await?;
    if entries.iter().any(|e| e == id.as_str()) {
        tracing::debug!(id = %id, list = %list_type, "cookie id already listed");
        return Ok(AddOutcome::AlreadyPresent);
    }

    entries.push(id.as_str().to_string());
    write_entries(storage, list_type, &entries).await?;
    tracing::info!(id = %id, list = %list_type, "cookie id added to list");
    Ok(AddOutcome::Added)
}

/// Remove a cookie id from a list. Returns true if an entry was removed.
pub async fn remove(storage: &Storage, id: &CookieId, list_type: ListType) -> Result<bool> {
    let _guard = storage.lock_writes().await;

    let mut entries = read_entries(storage, list_type).await?;
    let before = entries.len();
    entries.retain(|e| e != id.as_str());

    if entries.len() == before {
        return Ok(false);
    }

    write_entries(storage, list_type, &entries).await?;
    tracing::info!(id = %id, list = %list_type, "cookie id removed from list");
    Ok(true)
}

/// Load both lists in one snapshot for the evaluator.
pub async fn load(storage: &Storage) -> Result<ListSnapshot> {
    Ok(ListSnapshot {
        whitelist: read_set(storage, ListType::Whitelist).await?,
        graylist: read_set(storage, ListType::Graylist).await?,
    })
}

async fn read_entries(storage: &Storage, list_type: ListType) -> Result<Vec<String>> {
    match kv::get(storage.pool(), list_type.storage_key()).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

async fn write_entries(storage: &Storage, list_type: ListType, entries: &[String]) -> Result<()> {
    let value =
        serde_json::to_value(entries).map_err(|e| StoreError::Serialization(e.to_string()))?;
    kv::set(storage.pool(), list_type.storage_key(), &value).await
}

async fn read_set(storage: &Storage, list_type: ListType) -> Result<HashSet<CookieId>> {
    let entries = read_entries(storage, list_type).await?;
    // Ids that fail to parse are skipped rather than poisoning the whole
    // list; a malformed entry cannot match any live cookie anyway.
    Ok(entries
        .into_iter()
        .filter_map(|e| CookieId::parse(e).ok())
        .collect())
}
