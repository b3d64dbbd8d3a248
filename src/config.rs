//! Settings loading.
//!
//! Settings are read from a TOML file; every key is optional:
//!
//! ```toml
//! monitored_directory = "~/Desktop"
//! log_directory = "~/Documents"
//! monitor_on_start = true
//! debounce_ms = 1000
//! settle_ms = 0
//! ```

use crate::organizer::OrganizerOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".screenshot-organizer.toml";

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// IO error while reading configuration.
    #[error("io error reading configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// User settings consumed by the organizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory to watch and organize.
    pub monitored_directory: PathBuf,
    /// Directory the daily log file is written to.
    pub log_directory: PathBuf,
    /// Start monitoring as soon as the watcher launches.
    pub monitor_on_start: bool,
    /// Quiet window before a burst of events triggers a re-scan.
    pub debounce_ms: u64,
    /// Minimum age of a file before it is moved. 0 disables the check.
    pub settle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            monitored_directory: dirs::desktop_dir().unwrap_or_else(|| home.clone()),
            log_directory: dirs::document_dir().unwrap_or(home),
            monitor_on_start: true,
            debounce_ms: 1000,
            settle_ms: 0,
        }
    }
}

impl Settings {
    /// Load settings from a file, with fallback to defaults.
    ///
    /// Attempts to load settings in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.screenshot-organizer.toml` in the current directory
    /// 3. Look for `screenshot-organizer/config.toml` in the user config dir
    /// 4. Fall back to default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a file is explicitly provided but cannot be read,
    /// or if any file found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("screenshot-organizer").join("config.toml");
            if user_config.exists() {
                return Self::load_from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load settings from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text, expanding a leading `~` in paths.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut settings: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        settings.monitored_directory = expand_home(&settings.monitored_directory);
        settings.log_directory = expand_home(&settings.log_directory);
        Ok(settings)
    }

    /// The engine tunables described by these settings.
    pub fn organizer_options(&self) -> OrganizerOptions {
        OrganizerOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            settle: Duration::from_millis(self.settle_ms),
        }
    }
}

/// Replaces a leading `~` component with the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
