use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use tokio::sync::oneshot;

use crate::{Fetcher, LoadError};

pub const SQUARE: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "properties": {}, "geometry": {"type": "Polygon",
     "coordinates": [[[0, 0], [0, 10], [10, 10], [10, 0], [0, 0]]]}}
]}"#;

/// Serves a fixed response and counts requests.
pub struct FakeFetcher {
    pub response: Result<String, LoadError>,
    pub calls: Cell<usize>,
}

impl FakeFetcher {
    pub fn ok(body: &str) -> Rc<Self> {
        Rc::new(Self {
            response: Ok(body.to_string()),
            calls: Cell::new(0),
        })
    }

    pub fn failing(status: u16) -> Rc<Self> {
        Rc::new(Self {
            response: Err(LoadError::HttpStatus {
                url: "test://land".to_string(),
                status,
            }),
            calls: Cell::new(0),
        })
    }
}

impl Fetcher for FakeFetcher {
    fn fetch_text(&self, _url: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
        self.calls.set(self.calls.get() + 1);
        future::ready(self.response.clone()).boxed_local()
    }
}

/// Holds every request open until `release` is called.
pub struct GatedFetcher {
    body: String,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    release: RefCell<Option<oneshot::Sender<()>>>,
    pub calls: Cell<usize>,
}

impl GatedFetcher {
    pub fn new(body: &str) -> Rc<Self> {
        let (tx, rx) = oneshot::channel();
        Rc::new(Self {
            body: body.to_string(),
            gate: RefCell::new(Some(rx)),
            release: RefCell::new(Some(tx)),
            calls: Cell::new(0),
        })
    }

    pub fn release(&self) {
        if let Some(tx) = self.release.borrow_mut().take() {
            let _ = tx.send(());
        }
    }
}

impl Fetcher for GatedFetcher {
    fn fetch_text(&self, _url: &str) -> LocalBoxFuture<'static, Result<String, LoadError>> {
        self.calls.set(self.calls.get() + 1);
        let gate = self.gate.borrow_mut().take();
        let body = self.body.clone();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(body)
        }
        .boxed_local()
    }
}
