//! Orthographic projection of the unit sphere onto a 2D surface.
//!
//! Conventions follow the usual web-mapping ones: the rotation's `lambda`
//! is added to every longitude before projecting (so a positive lambda spins
//! the globe eastwards), `phi` tilts the view towards the poles, and screen
//! y grows downwards.

use super::{LonLat, Vec3};

/// A projected point in surface pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
    /// Cosine of the angular distance from the view centre. `1.0` faces the
    /// viewer, `0.0` is the limb, negative values are on the far side.
    pub depth: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Orthographic {
    /// Sphere radius in pixels.
    pub scale: f64,
    pub center: [f64; 2],
    pub rotate_lambda_deg: f64,
    pub rotate_phi_deg: f64,
    /// Points further than this from the view centre are clipped.
    pub clip_angle_deg: f64,
}

impl Default for Orthographic {
    fn default() -> Self {
        Self {
            scale: 1.0,
            center: [0.0, 0.0],
            rotate_lambda_deg: 0.0,
            rotate_phi_deg: 0.0,
            clip_angle_deg: 90.0,
        }
    }
}

impl Orthographic {
    pub fn new(scale: f64, center: [f64; 2], clip_angle_deg: f64) -> Self {
        Self {
            scale,
            center,
            clip_angle_deg,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, lambda_deg: f64, phi_deg: f64) -> Self {
        self.rotate_lambda_deg = lambda_deg;
        self.rotate_phi_deg = phi_deg;
        self
    }

    /// Position of `p` in the view frame: x towards the viewer, y to the
    /// right, z up.
    pub fn view_vector(&self, p: LonLat) -> Vec3 {
        let rotated = LonLat::new(p.lon_deg + self.rotate_lambda_deg, p.lat_deg);
        rotated
            .to_unit_vector()
            .rotate_y(self.rotate_phi_deg.to_radians())
    }

    /// Projects a position without clipping.
    pub fn project_unclipped(&self, p: LonLat) -> Projected {
        self.screen_from_view(self.view_vector(p))
    }

    /// Screen position of a view-frame vector.
    pub fn screen_from_view(&self, v: Vec3) -> Projected {
        Projected {
            x: self.center[0] + self.scale * v.y,
            y: self.center[1] - self.scale * v.z,
            depth: v.x,
        }
    }

    /// Where the chord from `a` to `b` (view-frame unit vectors) crosses the
    /// clip circle, pushed back onto the sphere. `None` when both ends are on
    /// the same side.
    pub fn clip_crossing(&self, a: Vec3, b: Vec3) -> Option<Projected> {
        let edge = self.clip_angle_deg.to_radians().cos();
        if self.is_visible_depth(a.x) == self.is_visible_depth(b.x) || a.x == b.x {
            return None;
        }
        let t = (a.x - edge) / (a.x - b.x);
        let on_chord = a.lerp(b, t).normalized()?;
        // Renormalising moves x off the clip plane slightly; pin it back.
        let radial = (1.0 - edge * edge).max(0.0).sqrt();
        let yz = (on_chord.y * on_chord.y + on_chord.z * on_chord.z).sqrt();
        let v = if yz > 0.0 {
            Vec3::new(edge, on_chord.y / yz * radial, on_chord.z / yz * radial)
        } else {
            on_chord
        };
        Some(self.screen_from_view(v))
    }

    /// Projects a position, returning `None` when it lies beyond the clip
    /// angle (the occluded hemisphere for the default 90°).
    pub fn project(&self, p: LonLat) -> Option<Projected> {
        let projected = self.project_unclipped(p);
        self.is_visible_depth(projected.depth).then_some(projected)
    }

    pub fn is_visible_depth(&self, depth: f64) -> bool {
        depth > self.clip_angle_deg.to_radians().cos()
    }
}
