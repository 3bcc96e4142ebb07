//! Print a summary of a point set file
//!
//! ```text
//! pointset_info scan.ply
//! pointset_info scan.ply --neighbors 6 --output scan_binary.ply
//! RUST_LOG=debug pointset_info scan_eval.ply
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pointclass_algorithms::{PointSetSpacing, SpacingOptions, DEFAULT_NEIGHBORS};
use pointclass_core::Drawable;
use pointclass_io::{read_point_set, write_point_set};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Read a point set, report its layout and spacing, and optionally rewrite it
#[derive(Parser)]
#[command(name = "pointset_info")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input point set file
    input: PathBuf,

    /// Write the (label-remapped) set to this file
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Neighbors measured per sample by the spacing estimator
    #[arg(long, short = 'k', default_value_t = DEFAULT_NEIGHBORS)]
    neighbors: usize,

    /// Seed for the spacing sampler
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let set = read_point_set(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    info!("Points: {}", set.count());
    info!(
        "Attributes: normals={} colors={} views={} labels={}",
        set.has_normals(),
        set.has_colors(),
        set.has_views(),
        set.has_labels()
    );

    if !set.is_empty() {
        let (min, max) = set.bounding_box();
        info!("Bounds: [{}, {}, {}] - [{}, {}, {}]", min.x, min.y, min.z, max.x, max.y, max.z);
    }

    if set.has_labels() {
        let mut histogram = [0usize; 256];
        for &label in &set.labels {
            histogram[label as usize] += 1;
        }
        for (code, &count) in histogram.iter().enumerate().filter(|(_, count)| **count > 0) {
            info!("Class {}: {} points", code, count);
        }
    }

    if !set.is_empty() {
        let mut options = SpacingOptions::default().with_neighbors(cli.neighbors);
        if let Some(seed) = cli.seed {
            options = options.with_seed(seed);
        }
        let spacing = set.spacing_with(&options).context("Failed to estimate spacing")?;
        info!("Spacing: {}", spacing);
    }

    if let Some(output) = &cli.output {
        write_point_set(&set, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    Ok(())
}
