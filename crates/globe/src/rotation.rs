/// Spin state shared by the animation tick and the drag controller.
///
/// At most one of them moves `longitudinal_angle` in a given frame: the tick
/// is a no-op while a drag is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    /// Degrees added to every longitude before projecting.
    pub longitudinal_angle: f64,
    pub rotation_speed_deg_per_tick: f64,
    pub is_user_dragging: bool,
}

impl RotationState {
    pub fn new(rotation_speed_deg_per_tick: f64) -> Self {
        Self {
            longitudinal_angle: 0.0,
            rotation_speed_deg_per_tick,
            is_user_dragging: false,
        }
    }

    /// Advances one auto-rotate step. Returns whether the angle changed.
    pub fn tick(&mut self, auto_rotate: bool) -> bool {
        if !auto_rotate || self.is_user_dragging || self.rotation_speed_deg_per_tick == 0.0 {
            return false;
        }
        self.longitudinal_angle = wrap_degrees(self.longitudinal_angle + self.rotation_speed_deg_per_tick);
        true
    }

    pub fn rotate_by(&mut self, delta_deg: f64) {
        self.longitudinal_angle = wrap_degrees(self.longitudinal_angle + delta_deg);
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Keeps the angle in `[0, 360)` so long sessions do not lose precision.
fn wrap_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}
