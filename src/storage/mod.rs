//! Typed, cached access to a string-keyed local store.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A synchronous store mapping keys to opaque strings
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// JSON (de)serialization over a [`KeyValueStore`] with an in-memory cache.
///
/// Values are read from the store at most once per key; every write goes to
/// the cache and then to the store. Without a store, reads fall back to the
/// caller's default and writes only reach the cache.
pub struct Persistence {
    store: Option<Arc<dyn KeyValueStore>>,
    cache: Mutex<HashMap<String, Value>>,
}

impl Persistence {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Persistence {
            store: Some(store),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// An adapter with no backing store, for contexts without local storage
    pub fn unavailable() -> Self {
        Persistence {
            store: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    /// The value under `key`, or `default` when nothing usable is stored
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let mut cache = self.lock_cache();

        if !cache.contains_key(key) {
            match self.load(key) {
                Some(value) => {
                    cache.insert(key.to_string(), value);
                }
                None => return default,
            }
        }

        match cache.get(key).cloned().map(serde_json::from_value) {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                warn!("Stored value under '{}' has an unexpected shape: {}", key, e);
                default
            }
            None => default,
        }
    }

    /// Store `value` under `key`. The cache is updated even if the store
    /// write fails, so the current session keeps seeing the new value; store
    /// failures are only logged.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize value for '{}': {}", key, e);
                return;
            }
        };
        let serialized = value.to_string();
        self.lock_cache().insert(key.to_string(), value);

        match &self.store {
            Some(store) => {
                if let Err(e) = store.set(key, &serialized) {
                    error!("Failed to save '{}' to local store: {}", key, e);
                }
            }
            None => debug!("No local store, '{}' kept in memory only", key),
        }
    }

    fn load(&self, key: &str) -> Option<Value> {
        let store = self.store.as_ref()?;
        let raw = match store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read '{}' from local store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring unreadable value under '{}': {}", key, e);
                None
            }
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
