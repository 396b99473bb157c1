//! Beacon configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BeaconError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeaconConfig {
    #[serde(default)]
    pub assets: AssetConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

impl BeaconConfig {
    /// Load config from the default path (~/.beacon/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BeaconError::Config(format!("Failed to read config: {e}")))?;
        Self::parse(&content)
    }

    /// Parse config from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| BeaconError::Config(format!("Failed to parse config: {e}")))
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| BeaconError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Beacon home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".beacon")
    }
}

/// Asset fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Upper bound on a single image fetch.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Directory holding bundled image resources referenced by bare name.
    #[serde(default = "default_resource_dir")]
    pub resource_dir: String,
    /// Largest image payload accepted, in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

fn default_fetch_timeout_secs() -> u64 { 10 }
fn default_user_agent() -> String { "Beacon/0.2".into() }
fn default_resource_dir() -> String { "~/.beacon/resources".into() }
fn default_max_bytes() -> u64 { 5 * 1024 * 1024 }

impl AssetConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            resource_dir: default_resource_dir(),
            max_bytes: default_max_bytes(),
        }
    }
}

/// Deferred-work scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// SQLite database holding pending scheduled notifications.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// How often the worker checks for due work.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

fn default_db_path() -> String { "~/.beacon/schedule.db".into() }
fn default_check_interval_secs() -> u64 { 5 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

/// Delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Buffered events per subscriber before lagging ones drop events.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize { 64 }

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BeaconConfig::default();
        assert_eq!(config.assets.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.scheduler.check_interval_secs, 5);
        assert_eq!(config.delivery.event_capacity, 64);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = BeaconConfig::parse(
            r#"
            [assets]
            fetch_timeout_secs = 3

            [scheduler]
            db_path = "/tmp/beacon.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.assets.fetch_timeout_secs, 3);
        assert_eq!(config.assets.user_agent, "Beacon/0.2");
        assert_eq!(config.scheduler.db_path, "/tmp/beacon.db");
        assert_eq!(config.scheduler.check_interval_secs, 5);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = BeaconConfig::parse("assets = 7").unwrap_err();
        assert!(matches!(err, BeaconError::Config(_)));
    }
}
