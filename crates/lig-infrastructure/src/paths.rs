//! Path management for LiG configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/lig/               # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/lig/          # Data directory
//! ├── records/                 # Default save directory ({objectName}.json)
//! └── logs/                    # Rolling log files
//!     └── lig-sync.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use lig_core::LigError;

const APP_DIR: &str = "lig";

/// Errors that can occur during path resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Home directory could not be determined.
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

impl From<PathError> for LigError {
    fn from(err: PathError) -> Self {
        LigError::config(err.to_string())
    }
}

pub struct LigPaths;

impl LigPaths {
    /// Returns the LiG configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/lig/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the LiG data directory.
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default directory for per-object record files.
    pub fn records_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("records"))
    }

    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("logs"))
    }
}
