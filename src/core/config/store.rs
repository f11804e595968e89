//! core::config::store
//!
//! JSON file store for [`Config`], plus an in-memory store for tests.
//!
//! # Security
//!
//! The state file holds the login token:
//! - File permissions are set to 0600 on Unix (owner read/write only)
//! - All writes are atomic (write to temp file, then rename)

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::{Config, ConfigError, ConfigStore};

/// Environment variable overriding the state file location.
pub const CONFIG_PATH_ENV: &str = "ARGUS_CONFIG";

/// JSON-file backed [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Store at `$ARGUS_CONFIG` or `~/.argus/config.json`.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    /// Store at a custom path.
    ///
    /// This is primarily useful for testing.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve the default state file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".argus").join("config.json"))
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let write_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ConfigError::WriteError { path, source }
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err(parent))?;
        }

        let contents = serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(write_err(&temp_path))?;

            // Restrict permissions before the token hits the disk
            #[cfg(unix)]
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_err(&temp_path))?;

            file.write_all(contents.as_bytes())
                .map_err(write_err(&temp_path))?;
            file.sync_all().map_err(write_err(&temp_path))?;
        }

        fs::rename(&temp_path, &self.path).map_err(write_err(&self.path))?;
        Ok(())
    }
}

/// In-memory [`ConfigStore`] that records every save.
///
/// Clones share state, so a test can keep one handle and give another to
/// the resolver.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    current: Config,
    saves: Vec<Config>,
    fail_saves: bool,
}

impl MemoryConfigStore {
    /// Create a store whose `load` returns `config`.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                current: config,
                ..Default::default()
            })),
        }
    }

    /// Make every subsequent `save` fail.
    pub fn fail_saves(&self) {
        self.lock().fail_saves = true;
    }

    /// Snapshots passed to `save`, in order.
    pub fn saves(&self) -> Vec<Config> {
        self.lock().saves.clone()
    }

    /// Number of `save` calls (failed ones included).
    pub fn save_count(&self) -> usize {
        self.lock().saves.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // A poisoned lock only means a test panicked mid-call.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.lock().current.clone())
    }

    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.saves.push(config.clone());
        if inner.fail_saves {
            return Err(ConfigError::WriteError {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::other("save disabled"),
            });
        }
        inner.current = config.clone();
        Ok(())
    }
}
