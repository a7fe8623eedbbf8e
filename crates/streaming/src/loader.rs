use std::cell::{Cell, RefCell};
use std::rc::Rc;

use catalog::KeyValueStore;
use compute::SamplerConfig;
use formats::LandCollection;
use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture, Shared};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    DEFAULT_CACHE_KEY, DEFAULT_TTL_MS, DatasetRepository, EarlyPreload, Fetcher, GlobeDataset,
    LoadError,
};

/// Natural Earth 1:50m land polygons.
pub const DEFAULT_LAND_URL: &str = "https://raw.githubusercontent.com/martynafford/natural-earth-geojson/refs/heads/master/50m/physical/ne_50m_land.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub url: String,
    pub cache_key: String,
    pub ttl_ms: u64,
    pub sampler: SamplerConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LAND_URL.to_string(),
            cache_key: DEFAULT_CACHE_KEY.to_string(),
            ttl_ms: DEFAULT_TTL_MS,
            sampler: SamplerConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// A repository keyed and aged according to this config.
    pub fn repository(&self, durable: Option<Box<dyn KeyValueStore>>) -> DatasetRepository {
        DatasetRepository::new(durable)
            .with_cache_key(self.cache_key.clone())
            .with_ttl_ms(self.ttl_ms)
    }
}

/// Where the most recent dataset came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Memory,
    EarlyValue,
    EarlyResult,
    Durable,
    Network,
}

type LoadFuture = Shared<LocalBoxFuture<'static, Result<Rc<GlobeDataset>, LoadError>>>;

struct LoaderInner {
    config: LoaderConfig,
    fetcher: Rc<dyn Fetcher>,
    repository: Rc<DatasetRepository>,
    early: Option<EarlyPreload>,
    in_flight: RefCell<Option<LoadFuture>>,
    last_source: Cell<Option<DatasetSource>>,
}

/// Produces the shared [`GlobeDataset`], trying in order the memory slot, the
/// early preload, the durable cache, and finally one network fetch.
///
/// Concurrent `preload` calls share a single attempt. A failed attempt is
/// forgotten so the next call starts over; nothing retries on its own.
#[derive(Clone)]
pub struct GlobeLoader {
    inner: Rc<LoaderInner>,
}

impl GlobeLoader {
    pub fn new(
        config: LoaderConfig,
        fetcher: Rc<dyn Fetcher>,
        repository: Rc<DatasetRepository>,
        early: Option<EarlyPreload>,
    ) -> Self {
        Self {
            inner: Rc::new(LoaderInner {
                config,
                fetcher,
                repository,
                early,
                in_flight: RefCell::new(None),
                last_source: Cell::new(None),
            }),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    pub fn repository(&self) -> &Rc<DatasetRepository> {
        &self.inner.repository
    }

    pub fn preload(&self) -> LocalBoxFuture<'static, Result<Rc<GlobeDataset>, LoadError>> {
        if let Some(dataset) = self.inner.repository.memory() {
            self.inner.last_source.set(Some(DatasetSource::Memory));
            return future::ready(Ok(dataset)).boxed_local();
        }
        if let Some(pending) = self.inner.in_flight.borrow().clone() {
            debug!("joining in-flight globe data load");
            return pending.boxed_local();
        }

        let weak = Rc::downgrade(&self.inner);
        let attempt = async move {
            let inner = weak.upgrade().ok_or(LoadError::Aborted)?;
            let result = inner.resolve().await;
            inner.in_flight.borrow_mut().take();
            result
        }
        .boxed_local()
        .shared();
        *self.inner.in_flight.borrow_mut() = Some(attempt.clone());
        attempt.boxed_local()
    }

    pub fn get_cached(&self) -> Option<Rc<GlobeDataset>> {
        self.inner.repository.memory()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.borrow().is_some()
    }

    pub fn last_source(&self) -> Option<DatasetSource> {
        self.inner.last_source.get()
    }
}

impl LoaderInner {
    async fn resolve(&self) -> Result<Rc<GlobeDataset>, LoadError> {
        if let Some(early) = &self.early {
            if let Some(collection) = early.value() {
                return Ok(self.adopt(&collection, DatasetSource::EarlyValue));
            }
            if early.is_started() {
                debug!("waiting for early preload");
                match early.result().await {
                    Some(collection) => {
                        return Ok(self.adopt(&collection, DatasetSource::EarlyResult));
                    }
                    None => warn!("early preload failed, falling back to own fetch"),
                }
            }
        }

        if let Some(collection) = self.repository.read_fresh() {
            return Ok(self.adopt(&collection, DatasetSource::Durable));
        }

        let text = self
            .fetcher
            .fetch_text(&self.config.url)
            .await
            .inspect_err(|err| error!(error = %err, "failed to load globe data"))?;
        let collection = LandCollection::from_geojson_str(&text)
            .map_err(LoadError::invalid_payload)
            .inspect_err(|err| error!(error = %err, "failed to load globe data"))?;
        self.repository.write_durable(&collection);
        Ok(self.adopt(&collection, DatasetSource::Network))
    }

    fn adopt(&self, collection: &LandCollection, source: DatasetSource) -> Rc<GlobeDataset> {
        let dataset = Rc::new(GlobeDataset::from_collection(collection, &self.config.sampler));
        self.repository.set_memory(dataset.clone());
        self.last_source.set(Some(source));
        info!(
            ?source,
            features = dataset.features.len(),
            dots = dataset.dots.len(),
            "globe dataset ready"
        );
        dataset
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{DatasetSource, GlobeLoader, LoaderConfig};
    use crate::test_support::{FakeFetcher, GatedFetcher, SQUARE};
    use crate::{DatasetRepository, EarlyPreload, Fetcher, LoadError};
    use catalog::{InMemoryStore, KeyValueStore};
    use formats::LandCollection;
    use foundation::{MILLIS_PER_HOUR, ManualClock};
    use futures_util::FutureExt;
    use futures_util::future::join;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NOW: u64 = 1_700_000_000_000;

    /// One plain square and one square with a square hole.
    const SCENARIO: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"featurecla": "Land"}, "geometry": {"type": "Polygon",
         "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]}},
        {"type": "Feature", "properties": {"featurecla": "Land"}, "geometry": {"type": "Polygon",
         "coordinates": [
            [[20, 0], [20, 10], [30, 10], [30, 0], [20, 0]],
            [[22, 2], [28, 2], [28, 8], [22, 8], [22, 2]]
         ]}}
    ]}"#;

    fn loader(fetcher: Rc<dyn Fetcher>, repository: DatasetRepository) -> GlobeLoader {
        GlobeLoader::new(LoaderConfig::default(), fetcher, Rc::new(repository), None)
    }

    fn durable_with_age(body: &str, age_ms: u64) -> DatasetRepository {
        let mut store = InMemoryStore::new();
        let content: serde_json::Value = serde_json::from_str(body).unwrap();
        let entry = json!({"content": content, "timestamp": NOW - age_ms});
        store.set("globe-data-cache", &entry.to_string()).unwrap();
        DatasetRepository::new(Some(Box::new(store))).with_clock(Rc::new(ManualClock::new(NOW)))
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_preloads_share_one_fetch() {
        let fetcher = FakeFetcher::ok(SQUARE);
        let loader = loader(fetcher.clone(), DatasetRepository::in_memory_only());

        let (a, b) = join(loader.preload(), loader.preload()).await;
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(fetcher.calls.get(), 1);

        let again = loader.preload().await.unwrap();
        assert!(Rc::ptr_eq(&a, &again));
        assert_eq!(loader.last_source(), Some(DatasetSource::Memory));
        assert_eq!(fetcher.calls.get(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn in_flight_attempt_is_visible_and_joined() {
        let fetcher = GatedFetcher::new(SQUARE);
        let loader = loader(fetcher.clone(), DatasetRepository::in_memory_only());
        assert!(!loader.is_loading());

        let mut first = loader.preload();
        assert!((&mut first).now_or_never().is_none());
        assert!(loader.is_loading());
        assert!(loader.get_cached().is_none());

        let second = loader.preload();
        fetcher.release();
        let (a, b) = join(first, second).await;
        assert!(Rc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(fetcher.calls.get(), 1);
        assert!(!loader.is_loading());
        assert!(loader.get_cached().is_some());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stale_durable_entry_falls_through_to_network() {
        let fetcher = FakeFetcher::ok(SQUARE);
        let loader = loader(fetcher.clone(), durable_with_age(SCENARIO, 25 * MILLIS_PER_HOUR));
        let dataset = loader.preload().await.unwrap();
        assert_eq!(fetcher.calls.get(), 1);
        assert_eq!(loader.last_source(), Some(DatasetSource::Network));
        assert_eq!(dataset.features.len(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fresh_durable_entry_is_used_as_stored() {
        let fetcher = FakeFetcher::ok(SQUARE);
        let loader = loader(fetcher.clone(), durable_with_age(SCENARIO, MILLIS_PER_HOUR));
        let dataset = loader.preload().await.unwrap();
        assert_eq!(fetcher.calls.get(), 0);
        assert_eq!(loader.last_source(), Some(DatasetSource::Durable));
        assert_eq!(
            dataset.features,
            LandCollection::from_geojson_str(SCENARIO).unwrap().features
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn network_fetch_populates_both_tiers() {
        let fetcher = FakeFetcher::ok(SQUARE);
        let repo = Rc::new(
            DatasetRepository::new(Some(Box::new(InMemoryStore::new())))
                .with_clock(Rc::new(ManualClock::new(NOW))),
        );
        let loader = GlobeLoader::new(LoaderConfig::default(), fetcher, repo.clone(), None);
        loader.preload().await.unwrap();
        assert!(repo.memory().is_some());
        assert_eq!(repo.read_fresh().map(|c| c.len()), Some(1));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn adopts_resolved_early_value_without_fetching() {
        let early_fetcher = FakeFetcher::ok(SCENARIO);
        let repo = Rc::new(DatasetRepository::in_memory_only());
        let early = EarlyPreload::new("test://land", early_fetcher.clone(), repo.clone());
        early.start();
        early.result().await.unwrap();

        let fetcher = FakeFetcher::ok(SQUARE);
        let loader = GlobeLoader::new(LoaderConfig::default(), fetcher.clone(), repo, Some(early));
        let dataset = loader.preload().await.unwrap();
        assert_eq!(dataset.features.len(), 2);
        assert_eq!(loader.last_source(), Some(DatasetSource::EarlyValue));
        assert_eq!(fetcher.calls.get(), 0);
        assert_eq!(early_fetcher.calls.get(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn waits_for_pending_early_result() {
        let early_fetcher = GatedFetcher::new(SCENARIO);
        let repo = Rc::new(DatasetRepository::in_memory_only());
        let early = EarlyPreload::new("test://land", early_fetcher.clone(), repo.clone());
        early.start();

        let fetcher = FakeFetcher::ok(SQUARE);
        let loader = GlobeLoader::new(LoaderConfig::default(), fetcher.clone(), repo, Some(early));
        let mut pending = loader.preload();
        assert!((&mut pending).now_or_never().is_none());
        early_fetcher.release();

        let dataset = pending.await.unwrap();
        assert_eq!(dataset.features.len(), 2);
        assert_eq!(loader.last_source(), Some(DatasetSource::EarlyResult));
        assert_eq!(fetcher.calls.get(), 0);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failed_early_preload_falls_back_to_own_fetch() {
        let repo = Rc::new(DatasetRepository::in_memory_only());
        let early = EarlyPreload::new("test://land", FakeFetcher::failing(500), repo.clone());
        early.start();

        let fetcher = FakeFetcher::ok(SQUARE);
        let loader = GlobeLoader::new(LoaderConfig::default(), fetcher.clone(), repo, Some(early));
        loader.preload().await.unwrap();
        assert_eq!(fetcher.calls.get(), 1);
        assert_eq!(loader.last_source(), Some(DatasetSource::Network));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn failure_is_reported_and_next_call_retries() {
        let fetcher = FakeFetcher::failing(404);
        let loader = loader(fetcher.clone(), DatasetRepository::in_memory_only());

        let err = loader.preload().await.unwrap_err();
        assert_eq!(
            err,
            LoadError::HttpStatus {
                url: "test://land".to_string(),
                status: 404
            }
        );
        assert!(!loader.is_loading());
        assert!(loader.get_cached().is_none());

        assert!(loader.preload().await.is_err());
        assert_eq!(fetcher.calls.get(), 2);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn malformed_payload_is_invalid_data() {
        let loader = loader(FakeFetcher::ok("{\"type\": \"Topology\"}"), DatasetRepository::in_memory_only());
        let err = loader.preload().await.unwrap_err();
        assert!(matches!(err, LoadError::InvalidData { .. }));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn broken_feature_geometry_does_not_fail_the_load() {
        let body = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
             "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]}},
            {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon"}}
        ]}"#;
        let dataset = loader(FakeFetcher::ok(body), DatasetRepository::in_memory_only())
            .preload()
            .await
            .unwrap();
        assert_eq!(dataset.features.len(), 2);
        assert_eq!(dataset.dots.len(), 25);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn two_feature_scenario_is_reproducible() {
        let first = loader(FakeFetcher::ok(SCENARIO), DatasetRepository::in_memory_only())
            .preload()
            .await
            .unwrap();
        let second = loader(FakeFetcher::ok(SCENARIO), DatasetRepository::in_memory_only())
            .preload()
            .await
            .unwrap();

        assert_eq!(first.features.len(), 2);
        assert_eq!(first.dots.len(), 25 + 16);
        assert_eq!(first.dots, second.dots);
        assert!(
            !first
                .dots
                .iter()
                .any(|d| d.lon_deg == 24.0 && d.lat_deg == 4.0)
        );
    }
}
