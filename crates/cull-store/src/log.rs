//! Cleanup log storage.
//!
//! An append-only record of deletions under the `cleanupLogs` key, pruned
//! oldest-first to a retention cap so the key never grows without bound.

use crate::connection::Storage;
use crate::error::{Result, StoreError};
use crate::kv;
use cull_core::LogEntry;

const KEY: &str = "cleanupLogs";

async fn read_entries(storage: &Storage) -> Result<Vec<LogEntry>> {
    match kv::get(storage.pool(), KEY).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

async fn write_entries(storage: &Storage, entries: &[LogEntry]) -> Result<()> {
    let value =
        serde_json::to_value(entries).map_err(|e| StoreError::Serialization(e.to_string()))?;
    kv::set(storage.pool(), KEY, &value).await
}

/// Append entries to the log, pruning the oldest past `retention_cap`.
pub async fn append(storage: &Storage, new_entries: Vec<LogEntry>, retention_cap: usize) -> Result<()> {
    if new_entries.is_empty() {
        return Ok(());
    }
    let _guard = storage.lock_writes().await;

    let mut entries = read_entries(storage).await?;
    entries.extend(new_entries);
    if entries.len() > retention_cap {
        let excess = entries.len() - retention_cap;
        entries.drain(..excess);
    }
    write_entries(storage, &entries).await
}

/// The full retained log, oldest first.
pub async fn entries(storage: &Storage) -> Result<Vec<LogEntry>> {
    read_entries(storage).await
}

/// Drop every retained entry.
pub async fn clear(storage: &Storage) -> Result<()> {
    let _guard = storage.lock_writes().await;
    kv::delete(storage.pool(), KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_storage;
    use cull_core::LogAction;

    fn entry(domain: &str) -> LogEntry {
        LogEntry::now(LogAction::Delete, domain, "removed")
    }

    #[tokio::test]
    async fn test_empty_log() {
        let storage = test_storage().await;
        assert!(entries(&storage).await.expect("read log").is_empty());
    }

    #[tokio::test]
    async fn test_append_and_read() {
        let storage = test_storage().await;

        append(&storage, vec![entry("a.com"), entry("b.com")], 512)
            .await
            .expect("append");
        append(&storage, vec![entry("c.com")], 512)
            .await
            .expect("append");

        let log = entries(&storage).await.expect("read log");
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].domain, "a.com");
        assert_eq!(log[2].domain, "c.com");
    }

    #[tokio::test]
    async fn test_append_empty_is_noop() {
        let storage = test_storage().await;
        append(&storage, Vec::new(), 512).await.expect("append");
        assert!(entries(&storage).await.expect("read log").is_empty());
    }

    #[tokio::test]
    async fn test_retention_cap_prunes_oldest() {
        let storage = test_storage().await;

        append(&storage, vec![entry("a.com"), entry("b.com")], 3)
            .await
            .expect("append");
        append(&storage, vec![entry("c.com"), entry("d.com")], 3)
            .await
            .expect("append");

        let log = entries(&storage).await.expect("read log");
        assert_eq!(log.len(), 3);
        let domains: Vec<&str> = log.iter().map(|e| e.domain.as_str()).collect();
        assert_eq!(domains, ["b.com", "c.com", "d.com"]);
    }

    #[tokio::test]
    async fn test_clear() {
        let storage = test_storage().await;

        append(&storage, vec![entry("a.com")], 512)
            .await
            .expect("append");
        clear(&storage).await.expect("clear");
        assert!(entries(&storage).await.expect("read log").is_empty());
    }
}
