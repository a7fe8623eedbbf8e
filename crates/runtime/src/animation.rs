//! Self-rescheduling animation loop.
//!
//! Each tick re-requests the next frame from its [`FrameSource`] after
//! running. The loop only lives as long as its [`LoopHandle`]: stopping or
//! dropping the handle cancels the outstanding frame, and the scheduled
//! callback holds a weak reference so a forgotten frame cannot revive it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::{Frame, FrameSource, PendingFrame};

struct LoopState {
    source: Rc<dyn FrameSource>,
    tick: RefCell<Box<dyn FnMut(Frame)>>,
    pending: RefCell<Option<Box<dyn PendingFrame>>>,
    running: Cell<bool>,
    frames: Cell<u64>,
}

pub struct AnimationLoop;

impl AnimationLoop {
    /// Requests the first frame and returns the handle that owns the loop.
    pub fn start(source: Rc<dyn FrameSource>, tick: impl FnMut(Frame) + 'static) -> LoopHandle {
        let state = Rc::new(LoopState {
            source,
            tick: RefCell::new(Box::new(tick)),
            pending: RefCell::new(None),
            running: Cell::new(true),
            frames: Cell::new(0),
        });
        schedule(&state);
        debug!("animation loop started");
        LoopHandle { state }
    }
}

fn schedule(state: &Rc<LoopState>) {
    let weak: Weak<LoopState> = Rc::downgrade(state);
    let pending = state.source.request(Box::new(move |timestamp_ms| {
        if let Some(state) = weak.upgrade() {
            on_frame(&state, timestamp_ms);
        }
    }));
    *state.pending.borrow_mut() = Some(pending);
}

fn on_frame(state: &Rc<LoopState>, timestamp_ms: f64) {
    // This frame has fired; its handle must not be cancelled later.
    state.pending.borrow_mut().take();
    if !state.running.get() {
        return;
    }

    let frame = Frame::new(state.frames.get(), timestamp_ms);
    state.frames.set(frame.index + 1);
    (&mut *state.tick.borrow_mut())(frame);

    if state.running.get() {
        schedule(state);
    }
}

/// Owner of a running [`AnimationLoop`].
pub struct LoopHandle {
    state: Rc<LoopState>,
}

impl LoopHandle {
    /// Cancels the outstanding frame. No tick runs after this returns.
    pub fn stop(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        if let Some(pending) = self.state.pending.borrow_mut().take() {
            pending.cancel();
        }
        debug!(frames = self.state.frames.get(), "animation loop stopped");
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn frames_run(&self) -> u64 {
        self.state.frames.get()
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
