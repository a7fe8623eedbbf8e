//! The 2D drawing primitives the renderer needs.
//!
//! Coordinates are CSS pixels; hosts apply device-pixel scaling themselves.

pub trait Surface {
    /// Logical size in CSS pixels.
    fn size(&self) -> (f64, f64);
    fn clear(&mut self);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Appends a full circle.
    fn arc(&mut self, x: f64, y: f64, radius: f64);
    fn fill(&mut self, color: &str);
    fn stroke(&mut self, color: &str, width: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    /// Empty slice for solid lines.
    fn set_line_dash(&mut self, segments: &[f64]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear,
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Arc { x: f64, y: f64, radius: f64 },
    Fill(String),
    Stroke { color: String, width: f64 },
    GlobalAlpha(f64),
    LineDash(Vec<f64>),
}

/// Surface that only records what was drawn.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Ops since the last `clear`.
    pub fn last_frame(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DrawOp::Clear)
            .map_or(0, |i| i + 1);
        &self.ops[start..]
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.last_frame().iter().filter(|op| pred(op)).count()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn begin_path(&mut self) {
        self.ops.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(DrawOp::LineTo(x, y));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64) {
        self.ops.push(DrawOp::Arc { x, y, radius });
    }

    fn fill(&mut self, color: &str) {
        self.ops.push(DrawOp::Fill(color.to_string()));
    }

    fn stroke(&mut self, color: &str, width: f64) {
        self.ops.push(DrawOp::Stroke {
            color: color.to_string(),
            width,
        });
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ops.push(DrawOp::GlobalAlpha(alpha));
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.ops.push(DrawOp::LineDash(segments.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawOp, RecordingSurface, Surface};

    #[test]
    fn last_frame_starts_after_the_latest_clear() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.arc(1.0, 1.0, 1.0);
        surface.clear();
        surface.begin_path();
        surface.fill("#000");

        assert_eq!(surface.last_frame(), &[DrawOp::BeginPath, DrawOp::Fill("#000".into())]);
        assert_eq!(surface.count(|op| matches!(op, DrawOp::Arc { .. })), 0);
    }
}
