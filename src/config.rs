//! TOML configuration with defaults and environment overrides.
//!
//! A missing configuration file is not an error: every setting has a default.
//! `FORMSMITH_STORAGE_PATH` and `FORMSMITH_LOG_LEVEL` override whatever the
//! file says.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;
use crate::store::SAVED_FORMS_KEY;

pub const STORAGE_PATH_ENV: &str = "FORMSMITH_STORAGE_PATH";
pub const LOG_LEVEL_ENV: &str = "FORMSMITH_LOG_LEVEL";

const VALID_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO-related errors (file access, permissions, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation errors
    #[error("Configuration validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where saved forms live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// sled database directory
    pub path: PathBuf,
    /// sled tree holding the collection
    pub tree: String,
    /// Key the whole saved-form collection is written under
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join("formsmith").join("db"),
            tree: "form_builder".to_string(),
            key: SAVED_FORMS_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsmithConfig {
    pub storage: StorageConfig,
    pub logging: LogConfig,
}

impl FormsmithConfig {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides to the configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(STORAGE_PATH_ENV) {
            if !path.trim().is_empty() {
                self.storage.path = PathBuf::from(path);
            }
        }
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(ConfigError::validation("storage.key must not be empty"));
        }
        if self.storage.tree.trim().is_empty() {
            return Err(ConfigError::validation("storage.tree must not be empty"));
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !VALID_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::validation(format!(
                "Unknown log level '{}'. Use one of: {}",
                self.logging.level,
                VALID_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

/// Loads configuration from `path`, falling back to defaults when no file is
/// given or the file does not exist.
pub fn load_config(path: Option<&Path>) -> ConfigResult<FormsmithConfig> {
    let mut config = match path {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(path)?;
            FormsmithConfig::from_toml_str(&content)?
        }
        _ => FormsmithConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
