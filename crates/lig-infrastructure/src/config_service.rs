//! Configuration service.
//!
//! Loads [`LigConfig`] from `~/.config/lig/config.toml` (or an explicit
//! path) and applies environment overrides on top.

use std::path::{Path, PathBuf};

use lig_core::config::LigConfig;
use lig_core::Result;
use tracing::{debug, info};

use crate::paths::LigPaths;
use crate::storage::AtomicFile;

/// Overrides `api_base_url`.
pub const ENV_API_URL: &str = "LIG_API_URL";
/// Overrides `save_dir`.
pub const ENV_SAVE_DIR: &str = "LIG_SAVE_DIR";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Service backed by the platform config file.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(LigPaths::config_file()?))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(&self) -> AtomicFile<LigConfig> {
        AtomicFile::new(self.path.clone())
    }

    /// Stored configuration without environment overrides. A missing file
    /// yields the defaults.
    pub fn load_stored(&self) -> Result<LigConfig> {
        let config = self.file().load()?.unwrap_or_default();
        debug!(path = %self.path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Stored configuration with `LIG_*` environment overrides applied.
    pub fn load(&self) -> Result<LigConfig> {
        let config = self.load_stored()?;
        Ok(apply_overrides(config, |key| std::env::var(key).ok()))
    }

    pub fn save(&self, config: &LigConfig) -> Result<()> {
        self.file().save(config)?;
        info!(path = %self.path.display(), "Saved configuration");
        Ok(())
    }

    /// Read-modify-write under the file lock.
    pub fn update(&self, f: impl FnOnce(&mut LigConfig)) -> Result<()> {
        self.file().update(LigConfig::default(), |config| {
            f(config);
            Ok(())
        })?;
        Ok(())
    }
}

/// Applies overrides from `lookup`. Empty values are ignored.
pub fn apply_overrides(mut config: LigConfig, lookup: impl Fn(&str) -> Option<String>) -> LigConfig {
    let value_of = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(url) = value_of(ENV_API_URL) {
        config.api_base_url = url;
    }
    if let Some(dir) = value_of(ENV_SAVE_DIR) {
        config.save_dir = Some(PathBuf::from(dir));
    }
    config
}
