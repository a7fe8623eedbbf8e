use std::cell::RefCell;
use std::rc::Rc;

use formats::LandCollection;
use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture, Shared};
use tracing::{info, warn};

use crate::{DatasetRepository, Fetcher};

type EarlyFuture = Shared<LocalBoxFuture<'static, Option<Rc<LandCollection>>>>;

/// Hands a future to the host executor, e.g. `wasm_bindgen_futures::spawn_local`.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

struct EarlyInner {
    url: String,
    fetcher: Rc<dyn Fetcher>,
    repository: Rc<DatasetRepository>,
    spawner: Option<Spawner>,
    value: RefCell<Option<Rc<LandCollection>>>,
    pending: RefCell<Option<EarlyFuture>>,
}

/// Fetch of the raw land collection that is kicked off before any globe
/// mounts, so a later [`GlobeLoader`](crate::GlobeLoader) can adopt its
/// result instead of fetching again.
///
/// Cloning shares the same underlying preload.
#[derive(Clone)]
pub struct EarlyPreload {
    inner: Rc<EarlyInner>,
}

impl EarlyPreload {
    pub fn new(
        url: impl Into<String>,
        fetcher: Rc<dyn Fetcher>,
        repository: Rc<DatasetRepository>,
    ) -> Self {
        Self {
            inner: Rc::new(EarlyInner {
                url: url.into(),
                fetcher,
                repository,
                spawner: None,
                value: RefCell::new(None),
                pending: RefCell::new(None),
            }),
        }
    }

    /// Drives the fetch on `spawner` as soon as [`start`](Self::start) runs.
    /// Without one the fetch only progresses while someone awaits
    /// [`result`](Self::result).
    ///
    /// Must be called before the preload is cloned.
    pub fn with_spawner(mut self, spawner: Spawner) -> Self {
        if let Some(inner) = Rc::get_mut(&mut self.inner) {
            inner.spawner = Some(spawner);
        } else {
            warn!("early preload already shared, spawner ignored");
        }
        self
    }

    /// Begins the preload. A fresh durable entry resolves synchronously;
    /// otherwise one fetch is issued. Later calls are no-ops.
    pub fn start(&self) {
        if self.is_started() {
            return;
        }

        let pending = if let Some(cached) = self.inner.repository.read_fresh() {
            info!("globe data available from cache");
            let cached = Rc::new(cached);
            *self.inner.value.borrow_mut() = Some(cached.clone());
            future::ready(Some(cached)).boxed_local()
        } else {
            info!(url = %self.inner.url, "starting early globe data fetch");
            let inner = Rc::downgrade(&self.inner);
            async move {
                let inner = inner.upgrade()?;
                fetch_collection(&inner).await
            }
            .boxed_local()
        };
        let pending = pending.shared();
        *self.inner.pending.borrow_mut() = Some(pending.clone());
        if let Some(spawn) = &self.inner.spawner {
            spawn(pending.map(drop).boxed_local());
        }
    }

    pub fn is_started(&self) -> bool {
        self.inner.pending.borrow().is_some()
    }

    /// The collection, once the preload has resolved successfully.
    pub fn value(&self) -> Option<Rc<LandCollection>> {
        self.inner.value.borrow().clone()
    }

    /// Resolves to the collection, or `None` if the preload failed or was
    /// never started.
    pub fn result(&self) -> LocalBoxFuture<'static, Option<Rc<LandCollection>>> {
        match self.inner.pending.borrow().clone() {
            Some(pending) => pending.boxed_local(),
            None => future::ready(None).boxed_local(),
        }
    }
}

async fn fetch_collection(inner: &EarlyInner) -> Option<Rc<LandCollection>> {
    let text = match inner.fetcher.fetch_text(&inner.url).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "early globe preload failed");
            return None;
        }
    };
    let collection = match LandCollection::from_geojson_str(&text) {
        Ok(collection) => collection,
        Err(err) => {
            warn!(error = %err, "early globe preload returned invalid data");
            return None;
        }
    };

    inner.repository.write_durable(&collection);
    let collection = Rc::new(collection);
    *inner.value.borrow_mut() = Some(collection.clone());
    info!(features = collection.len(), "globe data preloaded");
    Some(collection)
}
