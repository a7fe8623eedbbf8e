use std::cell::RefCell;
use std::rc::Rc;

use catalog::{KeyValueStore, get_json, set_json};
use formats::LandCollection;
use foundation::{Clock, MILLIS_PER_HOUR, SystemClock};
use tracing::{debug, warn};

use crate::{CachedCollection, GlobeDataset};

pub const DEFAULT_CACHE_KEY: &str = "globe-data-cache";
pub const DEFAULT_TTL_MS: u64 = 24 * MILLIS_PER_HOUR;

/// Two-tier dataset storage: a process-lifetime memory slot plus an optional
/// durable key-value backend.
///
/// The durable tier is best-effort. A missing backend, a read or write
/// failure, an undecodable entry and a stale entry all behave like a miss.
pub struct DatasetRepository {
    memory: RefCell<Option<Rc<GlobeDataset>>>,
    durable: RefCell<Option<Box<dyn KeyValueStore>>>,
    clock: Rc<dyn Clock>,
    cache_key: String,
    ttl_ms: u64,
}

impl DatasetRepository {
    pub fn new(durable: Option<Box<dyn KeyValueStore>>) -> Self {
        Self {
            memory: RefCell::new(None),
            durable: RefCell::new(durable),
            clock: Rc::new(SystemClock),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            ttl_ms: DEFAULT_TTL_MS,
        }
    }

    pub fn in_memory_only() -> Self {
        Self::new(None)
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cache_key(mut self, cache_key: impl Into<String>) -> Self {
        self.cache_key = cache_key.into();
        self
    }

    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn has_durable(&self) -> bool {
        self.durable.borrow().is_some()
    }

    pub fn memory(&self) -> Option<Rc<GlobeDataset>> {
        self.memory.borrow().clone()
    }

    pub fn set_memory(&self, dataset: Rc<GlobeDataset>) {
        *self.memory.borrow_mut() = Some(dataset);
    }

    /// The durable collection if one exists and is younger than the TTL.
    pub fn read_fresh(&self) -> Option<LandCollection> {
        let durable = self.durable.borrow();
        let store = durable.as_deref()?;
        let entry = match get_json::<CachedCollection>(store, &self.cache_key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = %self.cache_key, error = %err, "failed to read cached globe data");
                return None;
            }
        };

        let age_ms = self.clock.now().millis_since(foundation::Timestamp(entry.timestamp));
        if age_ms >= self.ttl_ms {
            debug!(key = %self.cache_key, age_ms, "cached globe data is stale");
            return None;
        }

        match LandCollection::from_geojson_value(&entry.content) {
            Ok(collection) => Some(collection),
            Err(err) => {
                warn!(key = %self.cache_key, error = %err, "cached globe data is not a land collection");
                None
            }
        }
    }

    /// Stores `collection` with the current timestamp. Failures are logged and
    /// dropped.
    pub fn write_durable(&self, collection: &LandCollection) {
        let mut durable = self.durable.borrow_mut();
        let Some(store) = durable.as_deref_mut() else {
            return;
        };
        let entry = CachedCollection {
            content: collection.to_geojson_value(),
            timestamp: self.clock.now().0,
        };
        if let Err(err) = set_json(store, &self.cache_key, &entry) {
            warn!(key = %self.cache_key, error = %err, "failed to cache globe data");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{DEFAULT_TTL_MS, DatasetRepository};
    use catalog::{CatalogError, InMemoryStore, KeyValueStore};
    use formats::LandCollection;
    use foundation::{MILLIS_PER_HOUR, ManualClock};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NOW: u64 = 1_700_000_000_000;

    fn land() -> LandCollection {
        LandCollection::from_geojson_value(&json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"featurecla": "Land"},
                "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]}
            }]
        }))
        .unwrap()
    }

    fn store_with_entry(age_ms: u64) -> Box<dyn KeyValueStore> {
        let mut store = InMemoryStore::new();
        let entry = json!({"content": land().to_geojson_value(), "timestamp": NOW - age_ms});
        store.set("globe-data-cache", &entry.to_string()).unwrap();
        Box::new(store)
    }

    fn repo(store: Box<dyn KeyValueStore>) -> DatasetRepository {
        DatasetRepository::new(Some(store)).with_clock(Rc::new(ManualClock::new(NOW)))
    }

    #[test]
    fn entry_older_than_ttl_is_a_miss() {
        assert_eq!(repo(store_with_entry(25 * MILLIS_PER_HOUR)).read_fresh(), None);
        assert_eq!(repo(store_with_entry(DEFAULT_TTL_MS)).read_fresh(), None);
    }

    #[test]
    fn recent_entry_is_returned_unmodified() {
        assert_eq!(repo(store_with_entry(MILLIS_PER_HOUR)).read_fresh(), Some(land()));
    }

    #[test]
    fn written_entries_are_read_back() {
        let clock = Rc::new(ManualClock::new(NOW));
        let repo = DatasetRepository::new(Some(Box::new(InMemoryStore::new())))
            .with_clock(clock.clone());
        repo.write_durable(&land());
        assert_eq!(repo.read_fresh(), Some(land()));

        clock.advance(DEFAULT_TTL_MS);
        assert_eq!(repo.read_fresh(), None);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, CatalogError> {
            Err(CatalogError::Io("disk on fire".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), CatalogError> {
            Err(CatalogError::QuotaExceeded("full".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<bool, CatalogError> {
            Ok(false)
        }
    }

    #[test]
    fn storage_failures_are_misses() {
        let repo = repo(Box::new(BrokenStore));
        repo.write_durable(&land());
        assert_eq!(repo.read_fresh(), None);

        let mut garbage = InMemoryStore::new();
        garbage.set("globe-data-cache", "[1, 2, 3]").unwrap();
        assert_eq!(DatasetRepository::new(Some(Box::new(garbage))).read_fresh(), None);
    }

    #[test]
    fn without_durable_backend_everything_misses() {
        let repo = DatasetRepository::in_memory_only();
        assert!(!repo.has_durable());
        repo.write_durable(&land());
        assert_eq!(repo.read_fresh(), None);
        assert!(repo.memory().is_none());
    }
}
