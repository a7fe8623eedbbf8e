use std::fmt::Write;

use globe::Surface;

/// Renders draw calls into a standalone SVG document. Each `fill`/`stroke`
/// becomes one `<path>` carrying the current alpha and dash state.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    path: String,
    alpha: f64,
    dash: Vec<f64>,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            path: String::new(),
            alpha: 1.0,
            dash: Vec::new(),
            elements: Vec::new(),
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        for element in &self.elements {
            out.push_str("  ");
            out.push_str(element);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        out
    }

    fn paint_attrs(&self) -> String {
        let mut attrs = String::new();
        if self.alpha < 1.0 {
            let _ = write!(attrs, r#" opacity="{}""#, self.alpha);
        }
        if !self.dash.is_empty() {
            let dash: Vec<String> = self.dash.iter().map(|d| d.to_string()).collect();
            let _ = write!(attrs, r#" stroke-dasharray="{}""#, dash.join(" "));
        }
        attrs
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.path.clear();
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.path, "M{x:.2} {y:.2}");
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.path, "L{x:.2} {y:.2}");
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64) {
        // Two half-circle arcs; a single arc cannot end where it starts.
        let _ = write!(
            self.path,
            "M{:.2} {y:.2}A{radius:.2} {radius:.2} 0 1 0 {:.2} {y:.2}A{radius:.2} {radius:.2} 0 1 0 {:.2} {y:.2}Z",
            x + radius,
            x - radius,
            x + radius,
        );
    }

    fn fill(&mut self, color: &str) {
        if self.path.is_empty() {
            return;
        }
        let element = format!(r#"<path d="{}" fill="{color}"{}/>"#, self.path, self.paint_attrs());
        self.elements.push(element);
    }

    fn stroke(&mut self, color: &str, width: f64) {
        if self.path.is_empty() {
            return;
        }
        let element = format!(
            r#"<path d="{}" fill="none" stroke="{color}" stroke-width="{width}"{}/>"#,
            self.path,
            self.paint_attrs()
        );
        self.elements.push(element);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        self.dash = segments.to_vec();
    }
}
