use serde::{Deserialize, Serialize};

/// Widget options. Field names deserialize from camelCase so hosts can pass
/// the same object a page would (`{"enableAutoRotate": false, ...}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobeConfig {
    /// Sphere radius in CSS pixels; `None` fits the surface.
    pub radius: Option<f64>,
    pub enable_pointer_interaction: bool,
    pub enable_auto_rotate: bool,
    /// Degrees of longitude per frame.
    pub auto_rotate_speed: f64,
    /// Dots and graticule.
    pub base_color: String,
    /// Sphere rim.
    pub glow_color: String,
    /// Ocean fill.
    pub background_color: String,
    pub outline_color: String,
    pub dot_radius: f64,
    /// Degrees of longitude per pixel of horizontal drag.
    pub drag_sensitivity: f64,
    pub graticule_alpha: f64,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: None,
            enable_pointer_interaction: true,
            enable_auto_rotate: true,
            auto_rotate_speed: 0.5,
            base_color: "#db7906".to_string(),
            glow_color: "#db7906".to_string(),
            background_color: "#ffffff0a".to_string(),
            outline_color: "#ffffff".to_string(),
            dot_radius: 1.2,
            drag_sensitivity: 0.5,
            graticule_alpha: 0.25,
        }
    }
}

impl GlobeConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw)
    }
}
