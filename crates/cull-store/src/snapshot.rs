//! Snapshot cache storage.
//!
//! Mirrors the platform's live cookie set under the `cachedCookies` key,
//! stamped with a strictly increasing `lastUpdateTime` in epoch
//! milliseconds. The scheduler owns all writes; UI-facing readers only
//! ever load a copy.

use crate::connection::Storage;
use crate::error::{Result, StoreError};
use crate::kv;
use cull_core::Cookie;
use serde::{Deserialize, Serialize};

const COOKIES_KEY: &str = "cachedCookies";
const TIMESTAMP_KEY: &str = "lastUpdateTime";

/// The persisted mirror of the live cookie set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotCache {
    /// The cookie set as of the last refresh
    pub cookies: Vec<Cookie>,
    /// Milliseconds since the Unix epoch; strictly increases per refresh
    pub last_update_time: i64,
}

/// Load the cached snapshot, or `None` before the first refresh.
pub async fn load(storage: &Storage) -> Result<Option<SnapshotCache>> {
    let cookies = match kv::get(storage.pool(), COOKIES_KEY).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?
        }
        None => return Ok(None),
    };

    let last_update_time = match kv::get(storage.pool(), TIMESTAMP_KEY).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?
        }
        None => 0,
    };

    Ok(Some(SnapshotCache {
        cookies,
        last_update_time,
    }))
}

/// Persist a fresh snapshot.
///
/// The stamp is the current wall clock, clamped to one millisecond past
/// the previous stamp so that `last_update_time` strictly increases even
/// when two refreshes land within the same clock tick. Both keys are
/// committed in one transaction; readers never see fresh cookies under a
/// stale stamp.
pub async fn store(storage: &Storage, cookies: &[Cookie]) -> Result<SnapshotCache> {
    let _guard = storage.lock_writes().await;

    let previous: i64 = match kv::get(storage.pool(), TIMESTAMP_KEY).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?
        }
        None => 0,
    };

    let now = chrono::Utc::now().timestamp_millis();
    let stamp = now.max(previous + 1);

    let cookies_value =
        serde_json::to_value(cookies).map_err(|e| StoreError::Serialization(e.to_string()))?;
    kv::set_many(
        storage.pool(),
        &[
            (COOKIES_KEY, cookies_value),
            (TIMESTAMP_KEY, serde_json::json!(stamp)),
        ],
    )
    .await?;

    tracing::debug!(cookies = cookies.len(), stamp, "snapshot cache refreshed");

    Ok(SnapshotCache {
        cookies: cookies.to_vec(),
        last_update_time: stamp,
    })
}
