//! Horizontal drag-to-spin.
//!
//! Only the x component of pointer motion is used; the view stays
//! equator-on. Mouse, pen and touch all map onto the same press/move/release
//! calls, and pointer-leave / touch-cancel should be routed to `on_release`.

use crate::RotationState;

#[derive(Debug, Clone)]
pub struct InteractionController {
    /// Degrees of longitude per pixel.
    pub sensitivity: f64,
    pub enabled: bool,
    last_pos_px: Option<[f64; 2]>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl InteractionController {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            enabled: true,
            last_pos_px: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.last_pos_px.is_some()
    }

    pub fn on_press(&mut self, pos_px: [f64; 2], rotation: &mut RotationState) {
        if !self.enabled {
            return;
        }
        self.last_pos_px = Some(pos_px);
        rotation.is_user_dragging = true;
    }

    /// Applies the horizontal delta since the previous event. Returns whether
    /// the rotation changed.
    pub fn on_move(&mut self, pos_px: [f64; 2], rotation: &mut RotationState) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(last) = self.last_pos_px else {
            return false;
        };
        self.last_pos_px = Some(pos_px);
        let dx = pos_px[0] - last[0];
        if dx == 0.0 {
            return false;
        }
        rotation.rotate_by(dx * self.sensitivity);
        true
    }

    pub fn on_release(&mut self, rotation: &mut RotationState) {
        self.last_pos_px = None;
        rotation.is_user_dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::InteractionController;
    use crate::RotationState;

    #[test]
    fn drag_delta_scales_by_sensitivity() {
        let mut rotation = RotationState::new(0.5);
        rotation.longitudinal_angle = 10.0;
        let mut controller = InteractionController::new(0.5);

        controller.on_press([100.0, 100.0], &mut rotation);
        assert!(rotation.is_user_dragging);
        assert!(controller.on_move([110.0, 100.0], &mut rotation));
        assert_eq!(rotation.longitudinal_angle, 15.0);

        // A tick during the drag must not also move the globe.
        assert!(!rotation.tick(true));
        assert_eq!(rotation.longitudinal_angle, 15.0);
    }

    #[test]
    fn vertical_motion_is_ignored() {
        let mut rotation = RotationState::new(0.5);
        let mut controller = InteractionController::new(0.5);
        controller.on_press([0.0, 0.0], &mut rotation);
        assert!(!controller.on_move([0.0, 250.0], &mut rotation));
        assert_eq!(rotation.longitudinal_angle, 0.0);
    }

    #[test]
    fn deltas_are_measured_from_the_previous_move() {
        let mut rotation = RotationState::new(0.5);
        let mut controller = InteractionController::new(1.0);
        controller.on_press([0.0, 0.0], &mut rotation);
        controller.on_move([5.0, 0.0], &mut rotation);
        controller.on_move([8.0, 3.0], &mut rotation);
        assert_eq!(rotation.longitudinal_angle, 8.0);
    }

    #[test]
    fn release_resumes_auto_rotation() {
        let mut rotation = RotationState::new(0.5);
        let mut controller = InteractionController::default();
        controller.on_press([0.0, 0.0], &mut rotation);
        controller.on_release(&mut rotation);
        assert!(!rotation.is_user_dragging);
        assert!(!controller.on_move([50.0, 0.0], &mut rotation));
        assert!(rotation.tick(true));
        assert_eq!(rotation.longitudinal_angle, 0.5);
    }

    #[test]
    fn disabled_controller_ignores_input() {
        let mut rotation = RotationState::new(0.5);
        let mut controller = InteractionController::new(0.5);
        controller.enabled = false;
        controller.on_press([0.0, 0.0], &mut rotation);
        assert!(!rotation.is_user_dragging);
        assert!(!controller.on_move([10.0, 0.0], &mut rotation));
        assert_eq!(rotation.longitudinal_angle, 0.0);
    }
}
