use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::constants::STORE_FILE_NAME;
use crate::logging;
use crate::sync::lock;

use super::{KeyValueStore, SharedStore, StorageError};

/// Key-value store persisted as one JSON object in a data directory.
///
/// The whole map is rewritten on every mutation through a temporary file and
/// a rename, so a crash leaves either the old or the new contents.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            action: "create data directory",
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(STORE_FILE_NAME);
        let entries = load_entries(&path)?;
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn open_shared(dir: impl AsRef<Path>) -> Result<SharedStore, StorageError> {
        Ok(Arc::new(Self::open(dir)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `mutate`, persist, and roll the in-memory map back if the write fails.
    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = lock(&self.entries);
        let previous = entries.clone();
        mutate(&mut *entries);
        if let Err(err) = persist(&self.path, &entries) {
            *entries = previous;
            return Err(err);
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !lock(&self.entries).contains_key(key) {
            return Ok(());
        }
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }

    fn clear_namespace(&self) -> Result<usize, StorageError> {
        let mut removed = 0;
        self.update(|entries| {
            let before = entries.len();
            entries.retain(|key, _| !super::is_namespaced(key));
            removed = before - entries.len();
        })?;
        Ok(removed)
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(StorageError::Io {
                action: "read store file",
                path: path.to_path_buf(),
                source,
            })
        }
    };

    match serde_json::from_str(&raw) {
        Ok(entries) => Ok(entries),
        Err(err) => {
            logging::warn(
                "storage.corrupt",
                "Store file is not a JSON object; starting empty",
                json!({ "path": path.display().to_string(), "error": err.to_string() }),
            );
            Ok(BTreeMap::new())
        }
    }
}

fn persist(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(entries).map_err(|source| StorageError::Serialize {
        key: path.display().to_string(),
        source,
    })?;

    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, payload).map_err(|source| StorageError::Io {
        action: "write store file",
        path: staging.clone(),
        source,
    })?;
    std::fs::rename(&staging, path).map_err(|source| StorageError::Io {
        action: "replace store file",
        path: path.to_path_buf(),
        source,
    })
}
