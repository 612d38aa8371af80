//! Configuration and directory resolution.
//!
//! Settings live in `config.toml` under the platform config directory
//! (`~/.config/todo/` on Linux). Every section is optional; a missing file
//! means defaults.
//!
//! # Environment Overrides
//! - `TODO_CONFIG_DIR` overrides [`config_dir`]
//! - `TODO_DATA_DIR` overrides [`data_dir`]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::task::DEFAULT_DATE_FORMAT;

const APP_DIR_NAME: &str = "todo";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub notifications: NotificationConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where task and reminder slots are kept (None = platform data dir).
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// When false, permission requests are denied and nothing is scheduled.
    pub enabled: bool,
    /// Ring the terminal bell when a reminder fires.
    pub sound: bool,
    /// Drop a task's pending reminder when the task is deleted.
    pub cancel_on_delete: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            cancel_on_delete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// strftime pattern for reminder times.
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        if !is_valid_date_format(&config.display.date_format) {
            log::warn!(
                "event=config_load module=config status=fallback reason=bad_date_format value={:?}",
                config.display.date_format
            );
            config.display.date_format = DEFAULT_DATE_FORMAT.to_string();
        }
        Ok(config)
    }

    /// Data directory after applying config and environment.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(data_dir)
    }
}

/// A strftime pattern chrono can render without panicking.
pub fn is_valid_date_format(pattern: &str) -> bool {
    !pattern.is_empty() && StrftimeItems::new(pattern).all(|item| !matches!(item, Item::Error))
}

/// Config directory (`dirs::config_dir()/todo`).
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("TODO_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".todo"))
}

/// Data directory (`dirs::data_dir()/todo`).
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("TODO_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".todo"))
}

/// Default config file path.
#[must_use]
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Log directory under a data directory.
#[must_use]
pub fn logs_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
