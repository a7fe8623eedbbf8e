//! Offline helpers behind the `globe` binary: fetch and cache the land
//! dataset, inspect the dot sampler, and render a frame to SVG.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use catalog::FileStore;
use compute::{SamplerConfig, sample_feature};
use formats::LandCollection;
use globe::{FrameStats, GlobeConfig, GlobeRenderer, RotationState};
use serde::Serialize;
use streaming::{DatasetSource, Fetcher, GlobeDataset, GlobeLoader, LoaderConfig};

pub mod svg;

pub use svg::SvgSurface;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchSummary {
    pub features: usize,
    pub dots: usize,
    pub source: String,
}

/// Loads the dataset through the full loader with a filesystem cache, so a
/// second run within the TTL is served from disk.
pub async fn fetch_dataset(
    config: LoaderConfig,
    cache_dir: &Path,
    fetcher: Rc<dyn Fetcher>,
) -> Result<FetchSummary, String> {
    let store = FileStore::open(cache_dir).map_err(|e| format!("open cache {cache_dir:?}: {e}"))?;
    let repository = Rc::new(config.repository(Some(Box::new(store))));
    let loader = GlobeLoader::new(config, fetcher, repository, None);
    let dataset = loader.preload().await.map_err(|e| e.to_string())?;
    Ok(FetchSummary {
        features: dataset.features.len(),
        dots: dataset.dots.len(),
        source: source_name(loader.last_source()).to_string(),
    })
}

fn source_name(source: Option<DatasetSource>) -> &'static str {
    match source {
        Some(DatasetSource::Memory) => "memory",
        Some(DatasetSource::EarlyValue) | Some(DatasetSource::EarlyResult) => "early preload",
        Some(DatasetSource::Durable) => "cache",
        Some(DatasetSource::Network) => "network",
        None => "unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSample {
    pub index: usize,
    pub label: String,
    pub dots: usize,
}

pub fn read_collection(path: &Path) -> Result<LandCollection, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    LandCollection::from_geojson_str(&text).map_err(|e| format!("parse {path:?}: {e}"))
}

/// Per-feature dot counts, in feature order.
pub fn sample_counts(collection: &LandCollection, sampler: &SamplerConfig) -> Vec<FeatureSample> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| FeatureSample {
            index,
            label: feature.label().to_string(),
            dots: sample_feature(feature, sampler).len(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

/// Draws a single ready frame of `collection`.
pub fn render_svg(
    collection: &LandCollection,
    sampler: &SamplerConfig,
    globe: &GlobeConfig,
    options: RenderOptions,
) -> (String, FrameStats) {
    let dataset = Rc::new(GlobeDataset::from_collection(collection, sampler));
    let mut renderer = GlobeRenderer::new();
    renderer.begin_loading();
    renderer.finish(Ok(dataset));

    let mut rotation = RotationState::new(0.0);
    rotation.rotate_by(options.angle_deg);

    let mut surface = SvgSurface::new(options.width, options.height);
    let stats = renderer.draw_frame(&mut surface, &rotation, globe);
    (surface.to_svg(), stats)
}
