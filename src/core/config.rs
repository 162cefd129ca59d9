//! Application configuration
//!
//! Settings live in a TOML file under the platform config directory.
//! Missing file means defaults; unknown keys are rejected so typos in
//! hand-edited configs surface early.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::paths;
use crate::error::{Result, StoreError};

/// Hours before the starred cache is considered stale
const DEFAULT_SYNC_STALENESS_HOURS: u64 = 6;

/// Upper bound for `sync_staleness_hours` (one year)
const MAX_SYNC_STALENESS_HOURS: u64 = 24 * 365;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hours before `starred sync` considers the local cache stale
    #[serde(default = "default_staleness")]
    pub sync_staleness_hours: u64,

    /// Where installed artifacts end up; platform data dir when unset
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Asset extensions tried first when several installable assets match
    /// (e.g. `["AppImage", "deb"]`)
    #[serde(default)]
    pub preferred_asset_kinds: Vec<String>,
}

fn default_staleness() -> u64 {
    DEFAULT_SYNC_STALENESS_HOURS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_staleness_hours: DEFAULT_SYNC_STALENESS_HOURS,
            download_dir: None,
            preferred_asset_kinds: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file, or defaults if it doesn't exist yet
    pub fn load() -> Result<Self> {
        let path = paths::config_path()?;
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = paths::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read a setting by its config-file key
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "sync_staleness_hours" => Ok(self.sync_staleness_hours.to_string()),
            "download_dir" => Ok(self
                .download_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            "preferred_asset_kinds" => Ok(self.preferred_asset_kinds.join(",")),
            _ => Err(StoreError::InvalidInput(format!(
                "Unknown setting '{}'. Valid keys: sync_staleness_hours, download_dir, preferred_asset_kinds",
                key
            ))),
        }
    }

    /// Write a setting by its config-file key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "sync_staleness_hours" => {
                let hours: u64 = value.parse().map_err(|_| {
                    StoreError::InvalidInput(format!(
                        "'{}' is not a valid number of hours",
                        value
                    ))
                })?;
                if hours > MAX_SYNC_STALENESS_HOURS {
                    return Err(StoreError::InvalidInput(format!(
                        "sync_staleness_hours must be at most {} (one year)",
                        MAX_SYNC_STALENESS_HOURS
                    )));
                }
                self.sync_staleness_hours = hours;
            }
            "download_dir" => {
                self.download_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "preferred_asset_kinds" => {
                self.preferred_asset_kinds = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            _ => {
                return Err(StoreError::InvalidInput(format!(
                    "Unknown setting '{}'. Valid keys: sync_staleness_hours, download_dir, preferred_asset_kinds",
                    key
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.sync_staleness_hours, 6);
        assert!(config.download_dir.is_none());
        assert!(config.preferred_asset_kinds.is_empty());
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut config = Config::default();

        config.set("sync_staleness_hours", "12").unwrap();
        assert_eq!(config.get("sync_staleness_hours").unwrap(), "12");

        config.set("preferred_asset_kinds", "AppImage, deb").unwrap();
        assert_eq!(config.get("preferred_asset_kinds").unwrap(), "AppImage,deb");

        config.set("download_dir", "/tmp/apps").unwrap();
        assert_eq!(config.get("download_dir").unwrap(), "/tmp/apps");
        config.set("download_dir", "").unwrap();
        assert!(config.download_dir.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut config = Config::default();
        assert!(config.set("no_such_key", "1").is_err());
        assert!(config.get("no_such_key").is_err());
        assert!(config.set("sync_staleness_hours", "abc").is_err());
    }

    #[test]
    fn staleness_hours_are_bounded() {
        let mut config = Config::default();
        assert!(config.set("sync_staleness_hours", "8760").is_ok());
        assert!(config.set("sync_staleness_hours", "8761").is_err());
        assert!(config.set("sync_staleness_hours", "99999999999999999").is_err());
        assert_eq!(config.sync_staleness_hours, 8760);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: Config = toml::from_str("sync_staleness_hours = 24").unwrap();
        assert_eq!(config.sync_staleness_hours, 24);
        assert!(config.preferred_asset_kinds.is_empty());
    }
}
