use crate::{CatalogError, KeyValueStore};

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{CatalogError, KeyValueStore};
    use wasm_bindgen::JsValue;

    /// Browser `localStorage`, keys optionally namespaced by a prefix.
    #[derive(Debug)]
    pub struct LocalStorageStore {
        key_prefix: String,
    }

    impl LocalStorageStore {
        /// Fails with `StorageUnavailable` when the page has no storage
        /// (private mode, sandboxed iframe, worker).
        pub fn new(key_prefix: impl Into<String>) -> Result<Self, CatalogError> {
            window_local_storage()?;
            Ok(Self {
                key_prefix: key_prefix.into(),
            })
        }

        fn full_key(&self, key: &str) -> String {
            if self.key_prefix.is_empty() {
                key.to_string()
            } else {
                format!("{}.{}", self.key_prefix, key)
            }
        }
    }

    impl KeyValueStore for LocalStorageStore {
        fn get(&self, key: &str) -> Result<Option<String>, CatalogError> {
            window_local_storage()?
                .get_item(&self.full_key(key))
                .map_err(|e| CatalogError::Io(format!("get_item({key}) failed: {:?}", e)))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
            window_local_storage()?
                .set_item(&self.full_key(key), value)
                .map_err(|e| storage_write_error(key, e))
        }

        fn remove(&mut self, key: &str) -> Result<bool, CatalogError> {
            let existed = self.get(key)?.is_some();
            window_local_storage()?
                .remove_item(&self.full_key(key))
                .map_err(|e| CatalogError::Io(format!("remove_item({key}) failed: {:?}", e)))?;
            Ok(existed)
        }
    }

    fn storage_write_error(key: &str, e: JsValue) -> CatalogError {
        let name = js_sys::Reflect::get(&e, &JsValue::from_str("name"))
            .ok()
            .and_then(|v| v.as_string());
        match name.as_deref() {
            Some("QuotaExceededError") | Some("NS_ERROR_DOM_QUOTA_REACHED") => {
                CatalogError::QuotaExceeded(format!("set_item({key})"))
            }
            _ => CatalogError::Io(format!("set_item({key}) failed: {:?}", e)),
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, CatalogError> {
        let win = web_sys::window().ok_or(CatalogError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| CatalogError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(CatalogError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageStore;

/// Native builds have no browser storage; every operation reports
/// `StorageUnavailable`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageStore {
    pub fn new(_key_prefix: impl Into<String>) -> Result<Self, CatalogError> {
        Err(CatalogError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, _key: &str) -> Result<Option<String>, CatalogError> {
        Err(CatalogError::StorageUnavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), CatalogError> {
        Err(CatalogError::StorageUnavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<bool, CatalogError> {
        Err(CatalogError::StorageUnavailable)
    }
}
