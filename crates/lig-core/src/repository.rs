//! Persistence of per-object documents in the save directory.

use std::path::PathBuf;

use crate::error::Result;

/// Stores one JSON record file per object plus exported path scripts.
pub trait ObjectRecordRepository: Send + Sync {
    /// Raw JSON text saved for `object_name`, or `None` if there is no file.
    fn load_record(&self, object_name: &str) -> Result<Option<String>>;

    /// Writes `{object_name}.json` and returns its path.
    fn save_record(&self, object_name: &str, json_data: &str) -> Result<PathBuf>;

    /// Writes `{object_name}_key_recode.txt` and returns its path.
    fn save_path_script(&self, object_name: &str, script: &str) -> Result<PathBuf>;
}
