mod file;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::constants::STORAGE_NAMESPACE;
use crate::logging;
use crate::sync::lock;

pub use file::FileStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to {action} {path:?}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise value for {key}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Local string key-value storage, the equivalent of a browser profile's
/// local store. Writes are synchronous and durable once they return.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn keys(&self) -> Vec<String>;

    /// Remove every key inside the application namespace and report how many went.
    fn clear_namespace(&self) -> Result<usize, StorageError> {
        let owned: Vec<String> = self.keys().into_iter().filter(|key| is_namespaced(key)).collect();
        for key in &owned {
            self.remove(key)?;
        }
        Ok(owned.len())
    }
}

pub type SharedStore = Arc<dyn KeyValueStore>;

pub fn identity_key() -> String {
    format!("{STORAGE_NAMESPACE}:identity")
}

pub fn subscriptions_key(identity_id: &str) -> String {
    format!("{STORAGE_NAMESPACE}:subscriptions:{identity_id}")
}

fn is_namespaced(key: &str) -> bool {
    key.strip_prefix(STORAGE_NAMESPACE)
        .is_some_and(|rest| rest.starts_with(':'))
}

/// Read and decode a JSON value; missing or malformed entries read as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            logging::warn(
                "storage.malformed",
                "Ignoring malformed stored value",
                json!({ "key": key, "error": err.to_string() }),
            );
            None
        }
    }
}

pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &encoded)
}

/// Process-local store; contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }
}
