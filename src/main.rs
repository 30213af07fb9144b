//! Vector Melt CLI
//!
//! Renders a synthetic sequence through the datamosh effect, optionally
//! writing PNG frames, per-frame digests and Prometheus counters.

use std::path::{Path, PathBuf};

use clap::Parser;
use image::RgbaImage;
use thiserror::Error;
use tracing::{error, info};

use vector_melt::{
    config::{ConfigError, FileConfig},
    effect::{DatamoshEffect, EffectError},
    ingest::{FrameSource, HostFrame, HostSurface, Pattern, SourceError, SyntheticSource},
    metrics::{MetricsError, MetricsRegistry, MetricsSnapshot},
    BufferError,
};

/// Render a synthetic sequence through the datamosh effect.
#[derive(Debug, Parser)]
#[command(name = "vector-melt", version, about)]
struct Cli {
    /// TOML file with `[effect]` and `[render]` sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to render.
    #[arg(long)]
    frames: Option<u64>,

    /// Frame width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Synthetic content: uniform, translate or noise.
    #[arg(long)]
    pattern: Option<Pattern>,

    /// Seed for the synthetic texture.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory to write `frame_NNNNN.png` files into.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print a BLAKE3 digest of every output frame.
    #[arg(long)]
    digest: bool,

    /// Print Prometheus metrics after rendering.
    #[arg(long)]
    metrics: bool,

    /// Emit the motion mask instead of the accumulator.
    #[arg(long)]
    debug_mask: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("frame source: {0}")]
    Source(#[from] SourceError),
    #[error("effect: {0}")]
    Effect(#[from] EffectError),
    #[error("frame conversion: {0}")]
    Buffer(#[from] BufferError),
    #[error("metrics: {0}")]
    Metrics(#[from] MetricsError),
    #[error("writing {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("creating output directory: {0}")]
    Io(#[from] std::io::Error),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Vector Melt v{}", vector_melt::VERSION);

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let render = &mut config.render;
    if let Some(frames) = cli.frames {
        render.frames = frames;
    }
    if let Some(width) = cli.width {
        render.width = width;
    }
    if let Some(height) = cli.height {
        render.height = height;
    }
    if let Some(pattern) = cli.pattern {
        render.pattern = pattern;
    }
    if let Some(seed) = cli.seed {
        render.seed = seed;
    }
    if cli.debug_mask {
        config.effect.show_mask = true;
    }

    config.validate()?;
    Ok(config)
}

fn write_png(dir: &Path, index: u64, frame: &HostFrame) -> Result<(), CliError> {
    let path = dir.join(format!("frame_{index:05}.png"));
    let image = RgbaImage::from_frame(frame)?;
    image.save(&path).map_err(|source| CliError::Image { path, source })
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let render = &config.render;

    if let Some(dir) = &cli.out {
        std::fs::create_dir_all(dir)?;
    }

    let mut source = SyntheticSource::new();
    source.open(render)?;

    let mut effect = DatamoshEffect::new();
    info!(
        width = render.width,
        height = render.height,
        frames = render.frames,
        pattern = ?render.pattern,
        "rendering sequence"
    );

    for index in 0..render.frames {
        let frame = source.next_frame()?;
        let params = config.effect.snapshot(index, render.frames, render.fps);
        let output = effect.process(&frame, &params, index)?;

        if let Some(dir) = &cli.out {
            write_png(dir, index, &output)?;
        }
        if cli.digest {
            let digest = blake3::hash(&output.buffer.to_packed());
            println!("{index:05} {}", digest.to_hex());
        }
    }
    source.close();

    let stats = effect.stats();
    info!(
        frames = stats.frames,
        updates = stats.update_frames,
        held = stats.held_frames,
        resets = stats.resets(),
        "done"
    );

    if cli.metrics {
        let registry = MetricsRegistry::new()?;
        registry.update(&MetricsSnapshot::from_stats(stats));
        print!("{}", registry.encode()?);
    }

    Ok(())
}
