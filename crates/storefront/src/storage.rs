//! Durable client storage on disk.
//!
//! The durable scope is a single JSON object of string keys to string values:
//!
//! ```text
//! ~/.local/share/sabor/
//! └── storage.json    {"user": "{\"id\":4,...}", "token": "eyJ..."}
//! ```
//!
//! The file is re-read on every access so concurrent clients see each
//! other's sign-ins and sign-outs.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use sabor_core::{Storage, StorageError};

type Items = BTreeMap<String, String>;

/// File-backed [`Storage`] scope.
///
/// # Features
///
/// - Atomic writes (write to temp, then rename)
/// - Automatic directory creation on first write
/// - A missing file reads as empty
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by the file at `path`. Nothing is touched until the
    /// first access.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a temporary file path for atomic writes.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("storage.json");
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn load(&self) -> Result<Items, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(Items::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Items::new()),
            Err(e) => Err(StorageError::backend(e)),
        }
    }

    /// Load for a read-modify-write. An unreadable document is replaced
    /// rather than blocking every later write.
    fn load_for_update(&self) -> Result<Items, StorageError> {
        match self.load() {
            Err(StorageError::Serialization(e)) => {
                warn!(path = %self.path.display(), error = %e, "Replacing corrupt storage file");
                Ok(Items::new())
            }
            other => other,
        }
    }

    fn save(&self, items: &Items) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(StorageError::backend)?;
        }

        let json = serde_json::to_string_pretty(items)?;
        let temp_path = self.temp_path();

        // Write to temp file first, then rename over the target
        fs::write(&temp_path, json).map_err(StorageError::backend)?;
        fs::rename(&temp_path, &self.path).map_err(StorageError::backend)?;

        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.load_for_update()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }

        let mut items = self.load_for_update()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}
