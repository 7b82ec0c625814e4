//! File-based ObjectRecordRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use lig_core::config::LigConfig;
use lig_core::repository::ObjectRecordRepository;
use lig_core::{LigError, Result};
use tracing::debug;

use crate::paths::LigPaths;
use crate::storage::write_atomic;

/// Stores `{objectName}.json` files in a save directory.
///
/// Responsibilities:
/// - Map object names to file names inside the save directory
/// - Write documents atomically
///
/// Does NOT:
/// - Parse or validate the JSON (callers own the record format)
pub struct JsonRecordRepository {
    save_dir: PathBuf,
}

impl JsonRecordRepository {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    /// Uses `config.save_dir`, falling back to the platform records directory.
    pub fn from_config(config: &LigConfig) -> Result<Self> {
        let save_dir = match &config.save_dir {
            Some(dir) => dir.clone(),
            None => LigPaths::records_dir()?,
        };
        Ok(Self::new(save_dir))
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Path of the record file for `object_name`.
    ///
    /// Path separators in the name are replaced so every file stays directly
    /// inside the save directory.
    pub fn record_path(&self, object_name: &str) -> PathBuf {
        self.save_dir.join(format!("{}.json", file_stem(object_name)))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<PathBuf> {
        write_atomic(path, contents.as_bytes())?;
        debug!(path = %path.display(), "Saved document");
        Ok(path.to_path_buf())
    }
}

fn file_stem(object_name: &str) -> String {
    object_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

impl ObjectRecordRepository for JsonRecordRepository {
    fn load_record(&self, object_name: &str) -> Result<Option<String>> {
        let path = self.record_path(object_name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LigError::from(e)),
        }
    }

    fn save_record(&self, object_name: &str, json_data: &str) -> Result<PathBuf> {
        self.write(&self.record_path(object_name), json_data)
    }

    fn save_path_script(&self, object_name: &str, script: &str) -> Result<PathBuf> {
        let file_name = lig_core::keyframe::path_script_file_name(&file_stem(object_name));
        self.write(&self.save_dir.join(file_name), script)
    }
}
