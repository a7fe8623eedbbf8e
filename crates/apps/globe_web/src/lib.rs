//! Browser host for the dotted globe.
//!
//! Pages call `start_early_preload()` as early as possible (it warms the
//! dataset before any canvas exists) and later `mount_globe(canvasId, config)`
//! for each canvas. All globes on a page share one loader, so the dataset is
//! fetched at most once.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use catalog::{KeyValueStore, LocalStorageStore};
use futures_util::future::LocalBoxFuture;
use gloo_events::{EventListener, EventListenerOptions};
use globe::{GlobeConfig, GlobeWidget, MountedGlobe};
use streaming::{DatasetRepository, EarlyPreload, Fetcher, GlobeLoader, HttpFetcher, LoadError, LoaderConfig};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Event, HtmlCanvasElement, PointerEvent};

mod canvas;
mod frames;

pub use canvas::CanvasSurface;
pub use frames::RafFrameSource;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

struct MountedCanvas {
    canvas_id: String,
    globe: Rc<MountedGlobe>,
    _listeners: Vec<EventListener>,
}

#[derive(Default)]
struct PageState {
    loader_config: LoaderConfig,
    repository: Option<Rc<DatasetRepository>>,
    early: Option<EarlyPreload>,
    loader: Option<GlobeLoader>,
    globes: Vec<MountedCanvas>,
}

thread_local! {
    static STATE: RefCell<PageState> = RefCell::new(PageState::default());
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    Ok(())
}

/// Begins fetching the land dataset (or adopts a fresh `localStorage` copy)
/// on the page's executor, without waiting for a globe to mount.
/// Safe to call more than once.
#[wasm_bindgen]
pub fn start_early_preload() {
    let early = STATE.with(|state| {
        let mut state = state.borrow_mut();
        if let Some(early) = &state.early {
            return early.clone();
        }
        let repository = page_repository(&mut state);
        let early = EarlyPreload::new(state.loader_config.url.clone(), fetcher(), repository)
            .with_spawner(Rc::new(|fut: LocalBoxFuture<'static, ()>| spawn_local(fut)));
        state.early = Some(early.clone());
        early
    });
    early.start();
}

/// Mounts a globe on the canvas with the given element id. `config_json` is
/// a (possibly empty) JSON object of widget options in camelCase.
#[wasm_bindgen]
pub fn mount_globe(canvas_id: &str, config_json: &str) -> Result<(), JsValue> {
    let config = GlobeConfig::from_json(config_json)
        .map_err(|e| JsValue::from_str(&format!("invalid globe config: {e}")))?;
    let canvas = find_canvas(canvas_id)?;
    let surface = CanvasSurface::new(canvas.clone())?;

    unmount_globe(canvas_id);

    let loader = STATE.with(|state| page_loader(&mut state.borrow_mut()));
    let interactive = config.enable_pointer_interaction;
    let globe = Rc::new(GlobeWidget::new(config).mount(surface, loader, Rc::new(RafFrameSource)));

    let listeners = if interactive {
        install_pointer_listeners(&canvas, &globe)?
    } else {
        Vec::new()
    };

    let load = globe.load();
    let id = canvas_id.to_string();
    spawn_local(async move {
        match load.await {
            Ok(()) => info!(canvas = %id, "globe ready"),
            Err(LoadError::Aborted) => debug!(canvas = %id, "globe load abandoned"),
            Err(err) => warn!(canvas = %id, %err, "globe failed to load"),
        }
    });

    STATE.with(|state| {
        state.borrow_mut().globes.push(MountedCanvas {
            canvas_id: canvas_id.to_string(),
            globe,
            _listeners: listeners,
        })
    });
    Ok(())
}

/// Stops and detaches the globe on `canvas_id`, if any.
#[wasm_bindgen]
pub fn unmount_globe(canvas_id: &str) -> bool {
    let removed = STATE.with(|state| {
        let mut state = state.borrow_mut();
        let index = state.globes.iter().position(|g| g.canvas_id == canvas_id)?;
        Some(state.globes.swap_remove(index))
    });
    match removed {
        Some(mounted) => {
            mounted.globe.unmount();
            true
        }
        None => false,
    }
}

/// Overlay text for the globe on `canvas_id`.
#[wasm_bindgen]
pub fn globe_status(canvas_id: &str) -> Option<String> {
    STATE.with(|state| {
        state
            .borrow()
            .globes
            .iter()
            .find(|g| g.canvas_id == canvas_id)
            .map(|g| g.globe.status_message())
    })
}

fn fetcher() -> Rc<dyn Fetcher> {
    Rc::new(HttpFetcher::new())
}

fn page_repository(state: &mut PageState) -> Rc<DatasetRepository> {
    if let Some(repository) = &state.repository {
        return repository.clone();
    }
    let durable: Option<Box<dyn KeyValueStore>> = match LocalStorageStore::new("") {
        Ok(store) => Some(Box::new(store)),
        Err(err) => {
            warn!(%err, "localStorage unavailable, globe data will not persist");
            None
        }
    };
    let repository = Rc::new(state.loader_config.repository(durable));
    state.repository = Some(repository.clone());
    repository
}

fn page_loader(state: &mut PageState) -> GlobeLoader {
    if let Some(loader) = &state.loader {
        return loader.clone();
    }
    let repository = page_repository(state);
    let loader = GlobeLoader::new(
        state.loader_config.clone(),
        fetcher(),
        repository,
        state.early.clone(),
    );
    state.loader = Some(loader.clone());
    loader
}

fn find_canvas(canvas_id: &str) -> Result<HtmlCanvasElement, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| JsValue::from_str(&format!("missing canvas #{canvas_id}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))
}

/// Pointer events cover mouse, pen and touch. `touch-action: none` keeps
/// horizontal drags from scrolling the page.
fn install_pointer_listeners(
    canvas: &HtmlCanvasElement,
    globe: &Rc<MountedGlobe>,
) -> Result<Vec<EventListener>, JsValue> {
    let style = canvas.style();
    style.set_property("touch-action", "none")?;
    style.set_property("cursor", "grab")?;

    let active = EventListenerOptions::enable_prevent_default();
    let mut listeners = Vec::new();

    let down_globe = globe.clone();
    let down_canvas = canvas.clone();
    listeners.push(EventListener::new_with_options(canvas, "pointerdown", active, move |event: &Event| {
        let Some(event) = event.dyn_ref::<PointerEvent>() else {
            return;
        };
        event.prevent_default();
        let _ = down_canvas.set_pointer_capture(event.pointer_id());
        let _ = down_canvas.style().set_property("cursor", "grabbing");
        down_globe.on_pointer_down(f64::from(event.offset_x()), f64::from(event.offset_y()));
    }));

    let move_globe = globe.clone();
    listeners.push(EventListener::new(canvas, "pointermove", move |event: &Event| {
        if let Some(event) = event.dyn_ref::<PointerEvent>() {
            move_globe.on_pointer_move(f64::from(event.offset_x()), f64::from(event.offset_y()));
        }
    }));

    for name in ["pointerup", "pointerleave", "pointercancel"] {
        let up_globe = globe.clone();
        let up_canvas = canvas.clone();
        listeners.push(EventListener::new(canvas, name, move |_event: &Event| {
            let _ = up_canvas.style().set_property("cursor", "grab");
            up_globe.on_pointer_up();
        }));
    }

    Ok(listeners)
}
