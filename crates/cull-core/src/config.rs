//! Engine configuration for cull.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. This covers engine tunables (alarm
//! cadences, log retention); the user-facing cleanup [`Settings`] live in
//! persisted storage instead, because the UI mutates them at runtime.
//!
//! [`Settings`]: crate::types::Settings

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main engine configuration.
///
/// This is loaded from `~/.config/cull/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Periodic alarm cadences
    pub alarms: AlarmConfig,
    /// Cleanup log retention
    pub log: LogConfig,
}

impl EngineConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `CULL_CLEANUP_INTERVAL_MINS`: Override the cleanup alarm cadence
    /// - `CULL_CACHE_REFRESH_INTERVAL_MINS`: Override the cache refresh cadence
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("CULL_CLEANUP_INTERVAL_MINS") {
            if let Ok(mins) = val.parse() {
                config.alarms.cleanup_interval_mins = mins;
                tracing::debug!("Override cleanup_interval_mins from env: {}", mins);
            }
        }

        if let Ok(val) = std::env::var("CULL_CACHE_REFRESH_INTERVAL_MINS") {
            if let Ok(mins) = val.parse() {
                config.alarms.cache_refresh_interval_mins = mins;
                tracing::debug!("Override cache_refresh_interval_mins from env: {}", mins);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/cull/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "cull", "cull").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path (where the storage database lives).
    ///
    /// Uses XDG base directories: `~/.local/share/cull`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "cull", "cull").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Cadences for the two independent periodic alarms.
///
/// The cleanup tick and the cache-refresh tick are deliberately separate
/// timers; refreshing the snapshot is much cheaper than a sweep and runs
/// more often.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Minutes between cleanup sweeps (when auto cleaning is enabled)
    pub cleanup_interval_mins: u64,
    /// Minutes between snapshot cache refreshes
    pub cache_refresh_interval_mins: u64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_mins: 30,
            cache_refresh_interval_mins: 5,
        }
    }
}

/// Cleanup log retention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum number of retained log entries; oldest are pruned first
    pub retention_cap: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { retention_cap: 512 }
    }
}
