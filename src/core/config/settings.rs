//! core::config::settings
//!
//! User-editable client settings (TOML).
//!
//! # Locations
//!
//! Searched in order, first found wins:
//! 1. `$ARGUS_SETTINGS` if set
//! 2. `$XDG_CONFIG_HOME/argus/settings.toml`
//! 3. `~/.argus/settings.toml`
//!
//! `$ARGUS_API_URL` overrides `api_url` from any file.
//!
//! # Example
//!
//! ```toml
//! api_url = "https://api.staging.argus.dev"
//! interactive = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.argus.dev";

/// Environment variable overriding the settings file location.
pub const SETTINGS_PATH_ENV: &str = "ARGUS_SETTINGS";

/// Environment variable overriding the API endpoint.
pub const API_URL_ENV: &str = "ARGUS_API_URL";

/// Client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// API base URL
    pub api_url: Option<String>,

    /// Default interactive mode
    pub interactive: Option<bool>,
}

impl Settings {
    /// Load settings from the standard locations.
    ///
    /// Missing files are not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match Self::find_path() {
            Some(path) => Self::read(&path)?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.is_empty() {
                settings.api_url = Some(url);
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse one settings file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn find_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("argus/settings.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::home_dir()?.join(".argus/settings.toml");
        path.exists().then_some(path)
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue(format!(
                    "api_url must start with http:// or https://, got '{}'",
                    url
                )));
            }
        }
        Ok(())
    }

    /// API base URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.interactive.unwrap_or(true)
    }
}
