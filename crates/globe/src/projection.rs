use foundation::math::Orthographic;

use crate::RotationState;

/// Sphere placement on the surface, recomputed every frame so resizes take
/// effect without a remount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    pub radius_px: f64,
    pub center_px: [f64; 2],
    pub clip_angle_deg: f64,
    /// Radius relative to the fitted radius; line widths and dot sizes
    /// scale with it.
    pub scale_factor: f64,
}

impl ProjectionConfig {
    pub fn from_surface(width: f64, height: f64, radius_override: Option<f64>) -> Self {
        let fitted = width.min(height).max(0.0) / 2.0;
        let radius_px = radius_override.filter(|r| *r > 0.0).unwrap_or(fitted);
        let scale_factor = if fitted > 0.0 { radius_px / fitted } else { 1.0 };
        Self {
            radius_px,
            center_px: [width / 2.0, height / 2.0],
            clip_angle_deg: 90.0,
            scale_factor,
        }
    }

    pub fn orthographic(&self, rotation: &RotationState) -> Orthographic {
        Orthographic::new(self.radius_px, self.center_px, self.clip_angle_deg)
            .with_rotation(rotation.longitudinal_angle, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use foundation::math::LonLat;

    use super::ProjectionConfig;
    use crate::RotationState;

    #[test]
    fn fits_the_shorter_side() {
        let config = ProjectionConfig::from_surface(800.0, 600.0, None);
        assert_eq!(config.radius_px, 300.0);
        assert_eq!(config.center_px, [400.0, 300.0]);
        assert_eq!(config.clip_angle_deg, 90.0);
        assert_eq!(config.scale_factor, 1.0);
    }

    #[test]
    fn radius_override_scales_strokes() {
        let config = ProjectionConfig::from_surface(400.0, 400.0, Some(100.0));
        assert_eq!(config.radius_px, 100.0);
        assert_eq!(config.scale_factor, 0.5);
    }

    #[test]
    fn empty_surface_keeps_unit_scale() {
        let config = ProjectionConfig::from_surface(0.0, 0.0, None);
        assert_eq!(config.radius_px, 0.0);
        assert_eq!(config.scale_factor, 1.0);
    }

    #[test]
    fn rotation_shifts_the_visible_hemisphere() {
        let config = ProjectionConfig::from_surface(200.0, 200.0, None);
        let mut rotation = RotationState::default();
        assert!(config.orthographic(&rotation).project(LonLat::new(180.0, 0.0)).is_none());

        rotation.longitudinal_angle = 180.0;
        let p = config.orthographic(&rotation).project(LonLat::new(180.0, 0.0)).unwrap();
        assert!((p.x - 100.0).abs() < 1e-9);
    }
}
