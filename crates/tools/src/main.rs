use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use compute::{MIN_STEP_DEG, SamplerConfig};
use globe::GlobeConfig;
use streaming::{DEFAULT_LAND_URL, HttpFetcher, LoaderConfig};
use tools::{RenderOptions, fetch_dataset, read_collection, render_svg, sample_counts};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "globe", about = "Dotted globe dataset and rendering tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the land dataset through the caching loader and report what came back.
    Fetch {
        #[arg(long, env = "GLOBE_DATA_URL", default_value = DEFAULT_LAND_URL)]
        url: String,
        #[arg(long, env = "GLOBE_CACHE_DIR", default_value = ".globe-cache")]
        cache_dir: PathBuf,
        /// Print the summary as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print per-feature dot counts for a GeoJSON FeatureCollection.
    Sample {
        input: PathBuf,
        #[arg(long, default_value_t = 20.0)]
        spacing: f64,
        #[arg(long, default_value_t = 1000)]
        cap: usize,
    },
    /// Draw one frame of the globe to an SVG file.
    Render {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
        /// Longitudinal rotation in degrees.
        #[arg(long, default_value_t = 0.0)]
        angle: f64,
        /// Widget options as JSON (camelCase keys).
        #[arg(long, default_value = "")]
        config: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Fetch {
            url,
            cache_dir,
            json,
        } => cmd_fetch(url, cache_dir, json),
        Command::Sample {
            input,
            spacing,
            cap,
        } => cmd_sample(input, spacing, cap),
        Command::Render {
            input,
            output,
            width,
            height,
            angle,
            config,
        } => {
            let options = RenderOptions {
                width,
                height,
                angle_deg: angle,
            };
            cmd_render(input, output, options, &config)
        }
    }
}

fn cmd_fetch(url: String, cache_dir: PathBuf, json: bool) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("tokio runtime: {e}"))?;

    let config = LoaderConfig {
        url,
        ..LoaderConfig::default()
    };
    info!(url = %config.url, cache = %cache_dir.display(), "loading globe data");
    let summary = runtime.block_on(fetch_dataset(config, &cache_dir, Rc::new(HttpFetcher::new())))?;

    if json {
        let payload = serde_json::to_string_pretty(&summary).map_err(|e| format!("json: {e}"))?;
        println!("{payload}");
    } else {
        println!(
            "{} features, {} dots (from {})",
            summary.features, summary.dots, summary.source
        );
    }
    Ok(())
}

fn cmd_sample(input: PathBuf, spacing: f64, cap: usize) -> Result<(), String> {
    let sampler = SamplerConfig {
        max_points_per_feature: cap,
        ..SamplerConfig::default().with_spacing(spacing)
    };
    if !sampler.has_usable_step() {
        return Err(format!(
            "--spacing {spacing} gives a raster step below {MIN_STEP_DEG} degrees"
        ));
    }
    let collection = read_collection(&input)?;

    let counts = sample_counts(&collection, &sampler);
    let mut total = 0;
    for sample in &counts {
        println!("{:>5}  {:>5}  {}", sample.index, sample.dots, sample.label);
        total += sample.dots;
    }
    println!("{total} dots across {} features", counts.len());
    Ok(())
}

fn cmd_render(input: PathBuf, output: PathBuf, options: RenderOptions, config: &str) -> Result<(), String> {
    if options.width <= 0.0 || options.height <= 0.0 {
        return Err("--width and --height must be positive".to_string());
    }
    let globe = GlobeConfig::from_json(config).map_err(|e| format!("--config: {e}"))?;
    let collection = read_collection(&input)?;

    let (svg, stats) = render_svg(&collection, &SamplerConfig::default(), &globe, options);
    fs::write(&output, svg).map_err(|e| format!("write {output:?}: {e}"))?;

    eprintln!(
        "wrote {} ({} dots drawn, {} culled)",
        output.display(),
        stats.dots_drawn,
        stats.dots_culled
    );
    Ok(())
}
