//! Shared, lock-guarded access to the live configuration.

use crate::config::Config;
use crate::error::ConfigError;
use parking_lot::{Mutex, MutexGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cloneable handle to the process-wide configuration.
///
/// The UI thread and the background update check both go through this
/// handle; holding the guard returned by [`ConfigHandle::lock`] is the coarse
/// exclusion scope for read-modify-save sequences.
#[derive(Debug, Clone)]
pub struct ConfigHandle {
    inner: Arc<Mutex<Config>>,
    path: Option<Arc<PathBuf>>,
}

impl ConfigHandle {
    /// Handle backed by a file; `save` writes to `path`.
    pub fn with_path(config: Config, path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
            path: Some(Arc::new(path.into())),
        }
    }

    /// Handle with no backing file; `save` only logs.
    pub fn in_memory(config: Config) -> Self {
        Self {
            inner: Arc::new(Mutex::new(config)),
            path: None,
        }
    }

    /// Load from `path` (creating defaults if missing) and wrap the result.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        Ok(Self::with_path(config, path))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    pub fn lock(&self) -> MutexGuard<'_, Config> {
        self.inner.lock()
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> Config {
        self.inner.lock().clone()
    }

    /// Persist the current configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config = self.inner.lock();
        Self::save_locked(self.path(), &config)
    }

    /// Persist while the caller already holds the guard.
    pub fn save_guarded(&self, config: &Config) -> Result<(), ConfigError> {
        Self::save_locked(self.path(), config)
    }

    fn save_locked(path: Option<&Path>, config: &Config) -> Result<(), ConfigError> {
        match path {
            Some(path) => config.save_to(path),
            None => {
                log::debug!("In-memory config handle, skipping save");
                Ok(())
            }
        }
    }
}
