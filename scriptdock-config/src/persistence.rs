//! Config persistence and path resolution for `Config`.
//!
//! Covers:
//! - `load` / `save` against the default location
//! - `load_from` / `save_to` against an explicit path (YAML with atomic write)
//! - XDG-style path helpers (`config_path`, `config_dir`)

use crate::config::Config;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "scriptdock";
const CONFIG_FILE: &str = "config.yaml";

impl Config {
    /// Load configuration from the default path, creating it with defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, creating it with defaults if absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Config path: {:?}", path);

        if path.exists() {
            let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
            let mut config: Config = if contents.trim().is_empty() {
                Config::default()
            } else {
                serde_yaml_ng::from_str(&contents)?
            };

            config.validate()?;

            // Merge in any new default keybindings that don't exist in user's config
            config.merge_default_keybindings();

            Ok(config)
        } else {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            Ok(config)
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(|e| ConfigError::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| ConfigError::io(path, e))?;

        Ok(())
    }

    /// Reject values that would break later stages.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.interpreter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "runner.interpreter must not be empty".to_string(),
            ));
        }
        if !self.last_updates_check_date.is_empty()
            && chrono::NaiveDate::parse_from_str(
                &self.last_updates_check_date,
                crate::config::CHECK_DATE_FORMAT,
            )
            .is_err()
        {
            // A corrupt date only means the next startup checks again.
            log::warn!(
                "Ignoring malformed last_updates_check_date '{}'",
                self.last_updates_check_date
            );
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join(APP_DIR)
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            // Use XDG convention on all platforms: ~/.config/scriptdock/config.yaml
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join(APP_DIR)
            } else {
                PathBuf::from(".")
            }
        }
    }
}
