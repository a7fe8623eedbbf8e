/// Metadata handed to each animation tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based index since the loop started.
    pub index: u64,
    /// Timestamp supplied by the frame source (milliseconds, source-defined
    /// origin).
    pub timestamp_ms: f64,
}

impl Frame {
    pub fn new(index: u64, timestamp_ms: f64) -> Self {
        Self {
            index,
            timestamp_ms,
        }
    }
}
