use std::cell::Cell;
use std::f64::consts::TAU;

use globe::Surface;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Canvas 2D surface in CSS pixels. The backing store follows the element's
/// layout size times the device pixel ratio and is re-synced at the start
/// of every frame.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    css_size: Cell<(f64, f64)>,
    dpr: Cell<f64>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let surface = Self {
            canvas,
            ctx,
            css_size: Cell::new((0.0, 0.0)),
            dpr: Cell::new(1.0),
        };
        surface.sync_size();
        Ok(surface)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn sync_size(&self) {
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .filter(|d| *d > 0.0)
            .unwrap_or(1.0);
        let css = (
            f64::from(self.canvas.client_width().max(0)),
            f64::from(self.canvas.client_height().max(0)),
        );
        if css == self.css_size.get() && dpr == self.dpr.get() {
            return;
        }
        self.canvas.set_width((css.0 * dpr).round() as u32);
        self.canvas.set_height((css.1 * dpr).round() as u32);
        self.css_size.set(css);
        self.dpr.set(dpr);
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (f64, f64) {
        self.sync_size();
        self.css_size.get()
    }

    fn clear(&mut self) {
        let dpr = self.dpr.get();
        let (w, h) = self.css_size.get();
        if let Err(err) = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0) {
            debug!(?err, "canvas setTransform failed");
        }
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64) {
        self.ctx.move_to(x + radius, y);
        if let Err(err) = self.ctx.arc(x, y, radius.max(0.0), 0.0, TAU) {
            debug!(?err, radius, "canvas arc failed");
        }
    }

    fn fill(&mut self, color: &str) {
        set_style(&self.ctx, "fillStyle", color);
        self.ctx.fill();
    }

    fn stroke(&mut self, color: &str, width: f64) {
        set_style(&self.ctx, "strokeStyle", color);
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_line_dash(&mut self, segments: &[f64]) {
        let array = js_sys::Array::new();
        for s in segments {
            array.push(&JsValue::from_f64(*s));
        }
        if let Err(err) = self.ctx.set_line_dash(&array) {
            debug!(?err, "canvas setLineDash failed");
        }
    }
}

// `fillStyle`/`strokeStyle` setters changed shape across web-sys releases.
fn set_style(ctx: &CanvasRenderingContext2d, property: &str, value: &str) {
    if let Err(err) = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str(property),
        &JsValue::from_str(value),
    ) {
        debug!(?err, property, "canvas style not applied");
    }
}
