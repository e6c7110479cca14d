//! Persisted key/value storage.
//!
//! Values are plain strings, the same shape a browser's local storage
//! offers. [`FileStore`] keeps them in one JSON object on disk and rewrites
//! the file after every mutation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SafariError};

/// Key for the "RSVP is open" flag.
pub const KEY_RSVP_ENABLED: &str = "rsvpEnabled";
/// Key for the "photo safari is enabled" flag.
pub const KEY_PHOTO_SAFARI_ENABLED: &str = "photoSafariEnabled";
/// Key for the admin mode flag.
pub const KEY_ADMIN: &str = "isAdmin";
/// Key for the JSON array of gallery photos.
pub const KEY_GALLERY: &str = "galleryPhotos";

/// String key/value storage.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory storage, lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| SafariError::Io {
                path: path.clone(),
                message: format!("Failed to read store: {}", e),
            })?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| SafariError::Parse {
                    message: format!("Invalid store file {}: {}", path.display(), e),
                    help: Some("The store must be a JSON object of string values".to_string()),
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "opened store");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `values` to disk; the in-memory map is only replaced by the
    /// caller once this succeeds.
    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SafariError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create store directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(values).map_err(|e| SafariError::Parse {
            message: format!("Failed to serialize store: {}", e),
            help: None,
        })?;

        // Replace atomically via a sibling temp file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| SafariError::Io {
            path: tmp.clone(),
            message: format!("Failed to write store: {}", e),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| SafariError::Io {
            path: self.path.clone(),
            message: format!("Failed to replace store: {}", e),
        })
    }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        let mut next = self.values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        self.values = next;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if !self.values.contains_key(key) {
            return Ok(());
        }
        let mut next = self.values.clone();
        next.remove(key);
        self.persist(&next)?;
        self.values = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1".to_string()).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set(KEY_ADMIN, "true".to_string()).unwrap();
        store.set(KEY_RSVP_ENABLED, "false".to_string()).unwrap();
        assert!(path.exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(KEY_ADMIN).unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.get(KEY_RSVP_ENABLED).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("k", "v".to_string()).unwrap();
        store.remove("k").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap(), None);
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let mut store = FileStore::open(blocker.join("store.json")).unwrap();
        assert!(store.set(KEY_ADMIN, "true".to_string()).is_err());
        assert_eq!(store.get(KEY_ADMIN).unwrap(), None);
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set("k", "v".to_string()).unwrap();

        // A directory squatting on the temp file path makes the next write fail.
        fs::create_dir(path.with_extension("json.tmp")).unwrap();
        assert!(store.remove("k").is_err());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(FileStore::open(&path), Err(SafariError::Parse { .. })));
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get(KEY_GALLERY).unwrap(), None);
    }
}
