//! Widget lifecycle: mount, load, animate, unmount.
//!
//! The mounted globe owns its surface and animation loop. Scheduled frames
//! and the load future only hold weak references to it, so dropping the
//! [`MountedGlobe`] is enough to tear everything down.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures_util::FutureExt;
use futures_util::future::{self, AbortHandle, Aborted, LocalBoxFuture, abortable};
use runtime::{AnimationLoop, FrameSource, LoopHandle};
use streaming::{GlobeDataset, GlobeLoader, LoadError};
use tracing::{debug, info};

use crate::{FrameStats, GlobeConfig, GlobeRenderer, InteractionController, RotationState, Surface};

/// Everything that survives between frames.
pub struct GlobeWidget {
    config: GlobeConfig,
    renderer: GlobeRenderer,
    rotation: RotationState,
    controller: InteractionController,
}

impl GlobeWidget {
    pub fn new(config: GlobeConfig) -> Self {
        let mut controller = InteractionController::new(config.drag_sensitivity);
        controller.enabled = config.enable_pointer_interaction;
        Self {
            rotation: RotationState::new(config.auto_rotate_speed),
            renderer: GlobeRenderer::new(),
            controller,
            config,
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    /// Attaches the widget to a surface. A dataset already in memory is shown
    /// straight away; otherwise the loading placeholder is drawn and
    /// [`MountedGlobe::load`] must be driven to finish.
    pub fn mount(
        self,
        surface: impl Surface + 'static,
        loader: GlobeLoader,
        frame_source: Rc<dyn FrameSource>,
    ) -> MountedGlobe {
        let inner = Rc::new(MountedInner {
            widget: RefCell::new(self),
            surface: RefCell::new(Box::new(surface)),
            loader,
            frame_source,
            animation: RefCell::new(None),
            load_abort: RefCell::new(None),
            last_stats: Cell::new(FrameStats::default()),
            unmounted: Cell::new(false),
        });

        match inner.loader.get_cached() {
            Some(dataset) => {
                info!("globe data already in memory");
                inner.settle(Ok(dataset));
            }
            None => {
                inner.widget.borrow_mut().renderer.begin_loading();
                inner.draw();
            }
        }
        MountedGlobe { inner }
    }
}

struct MountedInner {
    widget: RefCell<GlobeWidget>,
    surface: RefCell<Box<dyn Surface>>,
    loader: GlobeLoader,
    frame_source: Rc<dyn FrameSource>,
    animation: RefCell<Option<LoopHandle>>,
    load_abort: RefCell<Option<AbortHandle>>,
    last_stats: Cell<FrameStats>,
    unmounted: Cell<bool>,
}

impl MountedInner {
    fn draw(&self) {
        let widget = self.widget.borrow();
        let mut surface = self.surface.borrow_mut();
        let stats = widget
            .renderer
            .draw_frame(surface.as_mut(), &widget.rotation, &widget.config);
        self.last_stats.set(stats);
    }

    fn tick(&self) {
        {
            let mut widget = self.widget.borrow_mut();
            let auto_rotate = widget.config.enable_auto_rotate;
            widget.rotation.tick(auto_rotate);
        }
        self.draw();
    }

    fn settle(self: &Rc<Self>, outcome: Result<Rc<GlobeDataset>, LoadError>) {
        let ready = outcome.is_ok();
        self.widget.borrow_mut().renderer.finish(outcome);
        self.draw();
        if ready {
            self.start_animation();
        }
    }

    fn start_animation(self: &Rc<Self>) {
        if self.animation.borrow().is_some() {
            return;
        }
        let weak: Weak<MountedInner> = Rc::downgrade(self);
        let handle = AnimationLoop::start(self.frame_source.clone(), move |_frame| {
            if let Some(inner) = weak.upgrade() {
                inner.tick();
            }
        });
        *self.animation.borrow_mut() = Some(handle);
    }
}

/// A globe attached to a surface.
pub struct MountedGlobe {
    inner: Rc<MountedInner>,
}

impl MountedGlobe {
    /// Drives the loader and settles the renderer. On success the animation
    /// loop starts; on failure the globe stays in its error state and never
    /// animates. Resolves to [`LoadError::Aborted`] if the globe is unmounted
    /// first.
    pub fn load(&self) -> LocalBoxFuture<'static, Result<(), LoadError>> {
        if self.inner.unmounted.get() {
            return future::ready(Err(LoadError::Aborted)).boxed_local();
        }
        if self.inner.widget.borrow().renderer.is_terminal() {
            return future::ready(Ok(())).boxed_local();
        }

        let (pending, abort) = abortable(self.inner.loader.preload());
        if let Some(previous) = self.inner.load_abort.borrow_mut().replace(abort) {
            previous.abort();
        }
        let weak = Rc::downgrade(&self.inner);
        async move {
            let outcome = match pending.await {
                Ok(outcome) => outcome,
                Err(Aborted) => return Err(LoadError::Aborted),
            };
            let inner = weak.upgrade().ok_or(LoadError::Aborted)?;
            if inner.unmounted.get() {
                return Err(LoadError::Aborted);
            }
            inner.load_abort.borrow_mut().take();
            let result = outcome.as_ref().map(|_| ()).map_err(|err| err.clone());
            inner.settle(outcome);
            result
        }
        .boxed_local()
    }

    pub fn on_pointer_down(&self, x: f64, y: f64) {
        let mut widget = self.inner.widget.borrow_mut();
        let GlobeWidget {
            controller, rotation, ..
        } = &mut *widget;
        controller.on_press([x, y], rotation);
    }

    pub fn on_pointer_move(&self, x: f64, y: f64) -> bool {
        let mut widget = self.inner.widget.borrow_mut();
        let GlobeWidget {
            controller, rotation, ..
        } = &mut *widget;
        controller.on_move([x, y], rotation)
    }

    /// Also used for pointer-leave and touch-cancel.
    pub fn on_pointer_up(&self) {
        let mut widget = self.inner.widget.borrow_mut();
        let GlobeWidget {
            controller, rotation, ..
        } = &mut *widget;
        controller.on_release(rotation);
    }

    /// Redraws outside the animation loop, e.g. after a resize while the
    /// placeholder is showing.
    pub fn redraw(&self) {
        self.inner.draw();
    }

    pub fn status_message(&self) -> String {
        self.inner.widget.borrow().renderer.status_message().to_string()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.widget.borrow().renderer.is_ready()
    }

    pub fn is_animating(&self) -> bool {
        self.inner
            .animation
            .borrow()
            .as_ref()
            .is_some_and(LoopHandle::is_running)
    }

    pub fn rotation(&self) -> RotationState {
        self.inner.widget.borrow().rotation
    }

    pub fn last_frame_stats(&self) -> FrameStats {
        self.inner.last_stats.get()
    }

    /// Stops the animation loop and abandons any pending load. No frame is
    /// drawn after this returns.
    pub fn unmount(&self) {
        if self.inner.unmounted.replace(true) {
            return;
        }
        if let Some(handle) = self.inner.animation.borrow_mut().take() {
            handle.stop();
        }
        if let Some(abort) = self.inner.load_abort.borrow_mut().take() {
            abort.abort();
        }
        debug!("globe unmounted");
    }
}

impl Drop for MountedGlobe {
    fn drop(&mut self) {
        self.unmount();
    }
}
