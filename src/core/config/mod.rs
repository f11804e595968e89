//! core::config
//!
//! Persisted client state and user settings.
//!
//! # Overview
//!
//! Argus keeps two files:
//! - **State** (`~/.argus/config.json`): credential, selected organization and
//!   project, and the known-projects table. Written by the CLI.
//! - **Settings** (`~/.argus/settings.toml`): user-edited knobs such as the
//!   API endpoint. Never written by the CLI.
//!
//! State is loaded once per process through a [`ConfigStore`], threaded
//! through command-state resolution, and saved at the end.
//!
//! # Example
//!
//! ```no_run
//! use argus::core::config::{ConfigStore, FileConfigStore};
//!
//! let store = FileConfigStore::new().unwrap();
//! let mut config = store.load().unwrap();
//! config.organization_id = "org_123".to_string();
//! store.save(&config).unwrap();
//! ```

pub mod schema;
pub mod settings;
mod store;

pub use schema::{Config, Credential, KnownProject, RepoSnapshot};
pub use settings::Settings;
pub use store::{FileConfigStore, MemoryConfigStore, CONFIG_PATH_ENV};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Load/save access to the persisted [`Config`].
pub trait ConfigStore: Send + Sync {
    /// Load the persisted state. A missing file yields the default config.
    fn load(&self) -> Result<Config, ConfigError>;

    /// Persist `config`. Transient fields are never written.
    fn save(&self, config: &Config) -> Result<(), ConfigError>;
}
