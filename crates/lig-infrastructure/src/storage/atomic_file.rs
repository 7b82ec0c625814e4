//! Atomic file writes for the configuration document and record files.
//!
//! Saves go through a temporary sibling file and a rename so readers never
//! observe a half-written document. Read-modify-write cycles hold an
//! exclusive `fs2` lock on a sibling `.lock` file.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use lig_core::LigError;
use serde::{de::DeserializeOwned, Serialize};

/// Errors that can occur during atomic file operations.
#[derive(Debug, thiserror::Error)]
pub enum AtomicFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<AtomicFileError> for LigError {
    fn from(err: AtomicFileError) -> Self {
        match err {
            AtomicFileError::Io(e) => e.into(),
            AtomicFileError::TomlParse(e) => e.into(),
            AtomicFileError::TomlSerialize(e) => e.into(),
            AtomicFileError::Lock(message) => LigError::io(message),
        }
    }
}

/// A handle to a typed TOML document that is replaced atomically on save.
pub struct AtomicFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(toml::from_str(&content)?))
    }

    /// Serializes and saves the document atomically.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        let content = toml::to_string_pretty(data)?;
        write_atomic(&self.path, content.as_bytes())
    }

    /// Loads (or starts from `default_value`), applies `f`, and saves, all
    /// under an exclusive lock.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<(), AtomicFileError>
    where
        F: FnOnce(&mut T) -> Result<(), AtomicFileError>,
    {
        let _lock = FileLock::acquire(&self.path)?;
        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data)?;
        self.save(&data)
    }
}

/// Writes `contents` to `path` via a temporary sibling and rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), AtomicFileError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf, AtomicFileError> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Path has no file name")
    })?;
    Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
}

/// Exclusive lock released on drop.
struct FileLock {
    _file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| AtomicFileError::Lock(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock {
            _file: file,
            lock_path,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        base_url: String,
        workers: u32,
    }

    fn sample() -> Settings {
        Settings {
            base_url: "https://example.test".to_string(),
            workers: 5,
        }
    }

    #[test]
    fn test_toml_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Settings>::new(temp_dir.path().join("config.toml"));
        file.save(&sample()).unwrap();
        assert_eq!(file.load().unwrap(), Some(sample()));
    }

    #[test]
    fn test_load_nonexistent_or_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");
        let file = AtomicFile::<Settings>::new(path.clone());
        assert!(file.load().unwrap().is_none());
        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_applies_and_releases_lock() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");
        let file = AtomicFile::<Settings>::new(path.clone());

        file.update(sample(), |s| {
            s.workers += 1;
            Ok(())
        })
        .unwrap();
        file.update(sample(), |s| {
            s.workers += 1;
            Ok(())
        })
        .unwrap();

        assert_eq!(file.load().unwrap().unwrap().workers, 7);
        assert!(!path.with_extension("lock").exists());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");
        write_atomic(&path, b"{}").unwrap();
        assert!(path.exists());
        assert!(!temp_dir.path().join(".doc.json.tmp").exists());
    }
}
