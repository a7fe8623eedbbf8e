//! Durable key-value backends for cached datasets.
//!
//! Values are opaque strings (JSON documents in practice). Every backend is
//! fallible and callers are expected to treat failures as cache misses.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file_store::FileStore;
pub use local_storage::LocalStorageStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    StorageUnavailable,
    QuotaExceeded(String),
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::StorageUnavailable => write!(f, "durable storage unavailable"),
            CatalogError::QuotaExceeded(msg) => write!(f, "storage quota exceeded: {msg}"),
            CatalogError::Corrupt(msg) => write!(f, "stored value corrupt: {msg}"),
            CatalogError::Io(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, CatalogError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError>;
    /// Returns whether a value was present.
    fn remove(&mut self, key: &str) -> Result<bool, CatalogError>;
}

/// Reads `key` and decodes it as JSON. An empty value reads as absent.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, CatalogError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| CatalogError::Corrupt(e.to_string()))
}

pub fn set_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), CatalogError> {
    let raw = serde_json::to_string(value).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
    store.set(key, &raw)
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: BTreeMap<String, String>,
    /// Byte budget over all values; `None` is unbounded.
    quota_bytes: Option<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len())
            .sum()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CatalogError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        if let Some(quota) = self.quota_bytes {
            let needed = self.used_bytes_without(key) + value.len();
            if needed > quota {
                return Err(CatalogError::QuotaExceeded(format!(
                    "{needed} bytes requested, {quota} allowed"
                )));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, CatalogError> {
        Ok(self.entries.remove(key).is_some())
    }
}
