//! Settings storage.
//!
//! The process-wide [`Settings`] live as one JSON object under the
//! `settings` key. Loading an absent key yields the defaults; saving
//! validates at the boundary and writes nothing on rejection.

use crate::connection::Storage;
use crate::error::{Result, StoreError};
use crate::kv;
use cull_core::Settings;

const KEY: &str = "settings";

/// Load the settings, falling back to defaults when none are stored.
pub async fn load(storage: &Storage) -> Result<Settings> {
    match kv::get(storage.pool(), KEY).await? {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
        }
        None => Ok(Settings::default()),
    }
}

/// Validate and persist the settings.
///
/// # Errors
/// Returns `StoreError::Validation` for out-of-range input; no partial
/// write occurs.
pub async fn save(storage: &Storage, settings: &Settings) -> Result<()> {
    settings
        .validate()
        .map_err(|e| StoreError::Validation(e.to_string()))?;

    let value =
        serde_json::to_value(settings).map_err(|e| StoreError::Serialization(e.to_string()))?;
    kv::set(storage.pool(), KEY, &value).await?;
    tracing::info!("settings saved");
    Ok(())
}

/// Persist the default settings only if none are stored yet.
///
/// Used by the install trigger; deliberately does not clobber settings a
/// user already changed.
pub async fn seed_defaults(storage: &Storage) -> Result<()> {
    let _guard = storage.lock_writes().await;

    if kv::get(storage.pool(), KEY).await?.is_none() {
        let value = serde_json::to_value(Settings::default())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        kv::set(storage.pool(), KEY, &value).await?;
        tracing::info!("default settings seeded");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_storage;

    #[tokio::test]
    async fn test_load_defaults_when_absent() {
        let storage = test_storage().await;
        let settings = load(&storage).await.expect("load settings");
        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let storage = test_storage().await;

        let settings = Settings {
            enable_auto_cleaning: true,
            enable_graylist_cleanup: true,
            ..Settings::default()
        };
        save(&storage, &settings).await.expect("save settings");

        let loaded = load(&storage).await.expect("load settings");
        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn test_invalid_settings_rejected_without_write() {
        let storage = test_storage().await;

        let valid = Settings {
            enable_auto_cleaning: true,
            ..Settings::default()
        };
        save(&storage, &valid).await.expect("save valid settings");

        let invalid = Settings {
            cleaning_delay: 9999,
            ..Settings::default()
        };
        let result = save(&storage, &invalid).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));

        // The previous value is untouched.
        let loaded = load(&storage).await.expect("load settings");
        assert_eq!(loaded, valid);
    }

    #[tokio::test]
    async fn test_seed_defaults_does_not_clobber() {
        let storage = test_storage().await;

        let settings = Settings {
            enable_tab_cleanup: true,
            ..Settings::default()
        };
        save(&storage, &settings).await.expect("save settings");

        seed_defaults(&storage).await.expect("seed defaults");

        let loaded = load(&storage).await.expect("load settings");
        assert!(loaded.enable_tab_cleanup);
    }

    #[tokio::test]
    async fn test_seed_defaults_when_absent() {
        let storage = test_storage().await;
        seed_defaults(&storage).await.expect("seed defaults");

        let stored = kv::get(storage.pool(), KEY).await.expect("get raw value");
        assert!(stored.is_some());
    }
}
