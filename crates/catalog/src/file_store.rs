use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{CatalogError, KeyValueStore};

/// One file per key under a directory. Writes go through a temp file and a
/// rename so a crashed write never leaves a truncated value behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| CatalogError::Io(format!("create_dir_all({}): {e}", root.display())))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CatalogError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(CatalogError::Corrupt(format!("{}: {e}", path.display())))
            }
            Err(e) => Err(CatalogError::Io(format!("read {}: {e}", path.display()))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .map_err(|e| CatalogError::Io(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path)
            .map_err(|e| CatalogError::Io(format!("rename to {}: {e}", path.display())))?;
        debug!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, CatalogError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CatalogError::Io(format!("remove {}: {e}", path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FileStore;
    use crate::KeyValueStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn values_persist_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("globe-data-cache", r#"{"timestamp":1}"#).unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("globe-data-cache").unwrap().as_deref(),
            Some(r#"{"timestamp":1}"#)
        );
        assert!(dir.path().join("globe-data-cache.json").exists());
    }

    #[test]
    fn missing_keys_read_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("nested")).unwrap();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(!store.remove("nope").unwrap());
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        store.set("../escape/attempt", "x").unwrap();
        assert!(dir.path().join(".._escape_attempt.json").exists());
        assert!(store.remove("../escape/attempt").unwrap());
    }
}
