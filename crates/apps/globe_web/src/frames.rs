use gloo_render::{AnimationFrame, request_animation_frame};
use runtime::{FrameCallback, FrameSource, PendingFrame};

/// `requestAnimationFrame`-driven frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct RafFrameSource;

impl FrameSource for RafFrameSource {
    fn request(&self, callback: FrameCallback) -> Box<dyn PendingFrame> {
        Box::new(RafPending {
            _frame: request_animation_frame(callback),
        })
    }
}

/// Dropping the `AnimationFrame` cancels it.
struct RafPending {
    _frame: AnimationFrame,
}

impl PendingFrame for RafPending {
    fn cancel(self: Box<Self>) {}
}
