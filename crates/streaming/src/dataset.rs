use compute::{SampleDot, SamplerConfig, sample_collection};
use formats::{LandCollection, LandFeature};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Land features plus their precomputed halftone dots. Immutable once built;
/// shared as `Rc<GlobeDataset>`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeDataset {
    pub features: Vec<LandFeature>,
    pub dots: Vec<SampleDot>,
}

impl GlobeDataset {
    pub fn from_collection(collection: &LandCollection, sampler: &SamplerConfig) -> Self {
        Self {
            dots: sample_collection(collection, sampler),
            features: collection.features.clone(),
        }
    }
}

/// Durable cache entry: the raw FeatureCollection and when it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCollection {
    pub content: Value,
    /// Epoch milliseconds.
    pub timestamp: u64,
}
