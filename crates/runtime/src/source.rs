use std::cell::RefCell;
use std::rc::Rc;

/// Invoked once with the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// A requested frame that has not fired yet.
pub trait PendingFrame {
    /// Guarantees the callback will not run. Cancelling a frame that already
    /// fired is a no-op.
    fn cancel(self: Box<Self>);
}

/// Something that calls back once per display frame
/// (`requestAnimationFrame`, a test pump, ...).
pub trait FrameSource {
    fn request(&self, callback: FrameCallback) -> Box<dyn PendingFrame>;
}

#[derive(Default)]
struct ManualQueue {
    next_id: u64,
    callbacks: Vec<(u64, FrameCallback)>,
}

/// Frame source driven by explicit [`pump`](ManualFrameSource::pump) calls.
///
/// Clones share one queue.
#[derive(Clone, Default)]
pub struct ManualFrameSource {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires every callback queued before this call. Callbacks requested
    /// while pumping wait for the next pump. Returns how many fired.
    pub fn pump(&self, timestamp_ms: f64) -> usize {
        let due = std::mem::take(&mut self.queue.borrow_mut().callbacks);
        let fired = due.len();
        for (_, callback) in due {
            callback(timestamp_ms);
        }
        fired
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().callbacks.len()
    }
}

impl FrameSource for ManualFrameSource {
    fn request(&self, callback: FrameCallback) -> Box<dyn PendingFrame> {
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id;
        queue.next_id += 1;
        queue.callbacks.push((id, callback));
        Box::new(ManualPending {
            queue: Rc::downgrade(&self.queue),
            id,
        })
    }
}

struct ManualPending {
    queue: std::rc::Weak<RefCell<ManualQueue>>,
    id: u64,
}

impl PendingFrame for ManualPending {
    fn cancel(self: Box<Self>) {
        if let Some(queue) = self.queue.upgrade() {
            queue.borrow_mut().callbacks.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{FrameSource, ManualFrameSource};

    #[test]
    fn pump_fires_queued_callbacks_once() {
        let source = ManualFrameSource::new();
        let seen = Rc::new(Cell::new(0.0));
        let seen2 = seen.clone();
        let _pending = source.request(Box::new(move |ts| seen2.set(ts)));

        assert_eq!(source.pending(), 1);
        assert_eq!(source.pump(42.0), 1);
        assert_eq!(seen.get(), 42.0);
        assert_eq!(source.pump(43.0), 0);
    }

    #[test]
    fn cancelled_callbacks_never_fire() {
        let source = ManualFrameSource::new();
        let fired = Rc::new(Cell::new(false));
        let fired2 = fired.clone();
        let pending = source.request(Box::new(move |_| fired2.set(true)));
        pending.cancel();

        assert_eq!(source.pump(1.0), 0);
        assert!(!fired.get());
    }

    #[test]
    fn requests_made_while_pumping_wait_for_next_pump() {
        let source = ManualFrameSource::new();
        let inner = source.clone();
        let _pending = source.request(Box::new(move |_| {
            let _ = inner.request(Box::new(|_| {}));
        }));
        assert_eq!(source.pump(1.0), 1);
        assert_eq!(source.pending(), 1);
    }
}
