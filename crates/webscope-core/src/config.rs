//! Configuration management for WebScope.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/webscope/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scanning behavior settings
    pub scanning: ScanningConfig,
    /// Scan store settings
    pub store: StoreConfig,
}

/// Settings governing the scan pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Timeout in seconds for the raw-source refetch
    pub fetch_timeout_secs: u64,
    /// Maximum attempts when requesting a page snapshot from the host
    pub max_snapshot_attempts: u32,
    /// Base delay in milliseconds between snapshot attempts
    pub snapshot_retry_delay_ms: u64,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            max_snapshot_attempts: 3,
            snapshot_retry_delay_ms: 500,
        }
    }
}

/// Settings for the scan store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file; defaults to the XDG data directory
    pub path: Option<PathBuf>,
}

impl AppConfig {
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
    /// - `WEBSCOPE_FETCH_TIMEOUT_SECS`: Override the raw-source fetch timeout
    /// - `WEBSCOPE_MAX_SNAPSHOT_ATTEMPTS`: Override the snapshot retry budget
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("WEBSCOPE_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.scanning.fetch_timeout_secs = secs;
                tracing::debug!("Override fetch_timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("WEBSCOPE_MAX_SNAPSHOT_ATTEMPTS") {
            if let Ok(attempts) = val.parse() {
                config.scanning.max_snapshot_attempts = attempts;
                tracing::debug!("Override max_snapshot_attempts from env: {}", attempts);
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
    /// Uses XDG base directories: `~/.config/webscope/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("dev", "webscope", "webscope").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the default database path in the XDG data directory.
    ///
    /// An explicit `store.path` in the config file takes precedence.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.store.path {
            return Ok(path.clone());
        }
        let dirs =
            ProjectDirs::from("dev", "webscope", "webscope").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().join("webscope.db"))
    }
}
