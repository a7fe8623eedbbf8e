//! Load-state machine and per-frame drawing.

use std::rc::Rc;

use foundation::math::{LonLat, Orthographic};
use streaming::{GlobeDataset, LoadError};
use tracing::{debug, error};

use crate::{GlobeConfig, ProjectionConfig, RotationState, Surface, graticule_lines, trace_geometry, trace_line};

pub const STATUS_INITIALIZING: &str = "Initializing Globe...";
pub const STATUS_LOADING: &str = "Loading Globe Data...";
pub const STATUS_READY: &str = "Ready!";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load land map data";

const PLACEHOLDER_ALPHA: f64 = 0.3;
const PLACEHOLDER_DASH: [f64; 2] = [6.0, 6.0];

/// `Ready` and `Error` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    Uninitialized,
    Loading,
    Ready(Rc<GlobeDataset>),
    Error(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub dots_drawn: usize,
    pub dots_culled: usize,
}

pub struct GlobeRenderer {
    state: RenderState,
    graticule: Vec<Vec<LonLat>>,
}

impl Default for GlobeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobeRenderer {
    pub fn new() -> Self {
        Self {
            state: RenderState::Uninitialized,
            graticule: graticule_lines(),
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, RenderState::Ready(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, RenderState::Ready(_) | RenderState::Error(_))
    }

    /// Text for the host's status overlay.
    pub fn status_message(&self) -> &str {
        match &self.state {
            RenderState::Uninitialized => STATUS_INITIALIZING,
            RenderState::Loading => STATUS_LOADING,
            RenderState::Ready(_) => STATUS_READY,
            RenderState::Error(message) => message,
        }
    }

    /// Returns false if the renderer already settled.
    pub fn begin_loading(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.transition(RenderState::Loading);
        true
    }

    /// Settles the load. Ignored once terminal.
    pub fn finish(&mut self, outcome: Result<Rc<GlobeDataset>, LoadError>) {
        if self.is_terminal() {
            return;
        }
        match outcome {
            Ok(dataset) => self.transition(RenderState::Ready(dataset)),
            Err(err) => {
                error!(%err, "globe data failed to load");
                self.transition(RenderState::Error(LOAD_FAILED_MESSAGE.to_string()));
            }
        }
    }

    fn transition(&mut self, next: RenderState) {
        debug!(from = state_name(&self.state), to = state_name(&next), "globe render state");
        self.state = next;
    }

    /// Recomputes the projection from the surface, clears it and draws the
    /// current state.
    pub fn draw_frame<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        rotation: &RotationState,
        config: &GlobeConfig,
    ) -> FrameStats {
        let (width, height) = surface.size();
        let placement = ProjectionConfig::from_surface(width, height, config.radius);
        let projection = placement.orthographic(rotation);

        surface.clear();
        match &self.state {
            RenderState::Loading => {
                draw_placeholder(surface, &placement, config);
                FrameStats::default()
            }
            RenderState::Ready(dataset) => self.draw_globe(surface, &placement, &projection, dataset, config),
            RenderState::Uninitialized | RenderState::Error(_) => FrameStats::default(),
        }
    }

    fn draw_globe<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        placement: &ProjectionConfig,
        projection: &Orthographic,
        dataset: &GlobeDataset,
        config: &GlobeConfig,
    ) -> FrameStats {
        let sf = placement.scale_factor;
        let [cx, cy] = placement.center_px;

        // Ocean.
        surface.begin_path();
        surface.arc(cx, cy, placement.radius_px);
        surface.fill(&config.background_color);
        surface.stroke(&config.glow_color, 2.0 * sf);

        surface.begin_path();
        for line in &self.graticule {
            trace_line(surface, projection, line);
        }
        surface.set_global_alpha(config.graticule_alpha);
        surface.stroke(&config.base_color, sf);
        surface.set_global_alpha(1.0);

        surface.begin_path();
        for feature in &dataset.features {
            trace_geometry(surface, projection, &feature.geometry);
        }
        surface.stroke(&config.outline_color, sf);

        let (width, height) = surface.size();
        let mut stats = FrameStats::default();
        for dot in &dataset.dots {
            let on_canvas = projection
                .project(dot.position())
                .filter(|p| p.x >= 0.0 && p.x <= width && p.y >= 0.0 && p.y <= height);
            match on_canvas {
                Some(p) => {
                    surface.begin_path();
                    surface.arc(p.x, p.y, config.dot_radius * sf);
                    surface.fill(&config.base_color);
                    stats.dots_drawn += 1;
                }
                None => stats.dots_culled += 1,
            }
        }
        stats
    }
}

fn draw_placeholder<S: Surface + ?Sized>(surface: &mut S, placement: &ProjectionConfig, config: &GlobeConfig) {
    let [cx, cy] = placement.center_px;
    surface.set_global_alpha(PLACEHOLDER_ALPHA);
    surface.set_line_dash(&PLACEHOLDER_DASH);
    surface.begin_path();
    surface.arc(cx, cy, placement.radius_px);
    surface.stroke(&config.base_color, 2.0 * placement.scale_factor);
    surface.set_line_dash(&[]);
    surface.set_global_alpha(1.0);
}

fn state_name(state: &RenderState) -> &'static str {
    match state {
        RenderState::Uninitialized => "uninitialized",
        RenderState::Loading => "loading",
        RenderState::Ready(_) => "ready",
        RenderState::Error(_) => "error",
    }
}
