//! Halftone dot sampling over land polygons.
//!
//! Each feature's bounding box is raster-scanned at `dot_spacing *
//! step_fraction` degrees, longitude outer and latitude inner, and every grid
//! point inside the feature becomes a dot. Sampling is pure: the same
//! geometry and config always produce the same dots in the same order.

use foundation::math::LonLat;
use formats::{LandCollection, LandFeature};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::containment::{Containment, feature_bounds};

/// Raster steps finer than this are refused; the scan would never finish.
pub const MIN_STEP_DEG: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Coarse dot spacing in degrees.
    pub dot_spacing: f64,
    /// Raster step as a fraction of `dot_spacing`.
    pub step_fraction: f64,
    /// Per-feature hard cap on emitted dots.
    pub max_points_per_feature: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            dot_spacing: 20.0,
            step_fraction: 0.1,
            max_points_per_feature: 1000,
        }
    }
}

impl SamplerConfig {
    pub fn with_spacing(mut self, dot_spacing: f64) -> Self {
        self.dot_spacing = dot_spacing;
        self
    }

    pub fn step_deg(&self) -> f64 {
        self.dot_spacing * self.step_fraction
    }

    /// Whether the raster step is finite and no finer than [`MIN_STEP_DEG`].
    pub fn has_usable_step(&self) -> bool {
        let step = self.step_deg();
        step.is_finite() && step >= MIN_STEP_DEG
    }
}

/// A sampled point guaranteed to lie inside some land feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleDot {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl SampleDot {
    pub fn position(&self) -> LonLat {
        LonLat::new(self.lon_deg, self.lat_deg)
    }
}

impl From<LonLat> for SampleDot {
    fn from(p: LonLat) -> Self {
        Self {
            lon_deg: p.lon_deg,
            lat_deg: p.lat_deg,
        }
    }
}

pub fn sample_feature(feature: &LandFeature, config: &SamplerConfig) -> Vec<SampleDot> {
    let mut dots = Vec::new();
    if !config.has_usable_step() || config.max_points_per_feature == 0 {
        return dots;
    }
    let step = config.step_deg();
    let Some(bounds) = feature_bounds(feature) else {
        return dots;
    };

    let mut i = 0u64;
    'scan: loop {
        let lon = bounds.min.lon_deg + i as f64 * step;
        if lon > bounds.max.lon_deg {
            break;
        }
        let mut j = 0u64;
        loop {
            let lat = bounds.min.lat_deg + j as f64 * step;
            if lat > bounds.max.lat_deg {
                break;
            }
            let p = LonLat::new(lon, lat);
            if feature.contains(p) {
                dots.push(SampleDot::from(p));
                if dots.len() >= config.max_points_per_feature {
                    break 'scan;
                }
            }
            j += 1;
        }
        i += 1;
    }

    debug!(
        dots = dots.len(),
        feature = feature.label(),
        "sampled land feature"
    );
    dots
}

/// Samples every feature and concatenates the dots in feature order.
pub fn sample_collection(collection: &LandCollection, config: &SamplerConfig) -> Vec<SampleDot> {
    let dots: Vec<SampleDot> = collection
        .features
        .iter()
        .flat_map(|feature| sample_feature(feature, config))
        .collect();
    debug!(
        dots = dots.len(),
        features = collection.len(),
        "sampled land collection"
    );
    dots
}
