//! Synthetic Sonic Log Generator
//!
//! Writes a CSV log through a sand with a hydrocarbon column over a water
//! leg, forward-modelled with Gassmann + Wood. Output carries `SW_TRUE` so
//! `sonic-sw` reports accuracy against it.
//!
//! # Usage
//! ```bash
//! ./synthetic-log --seed 7 --hc-sw 0.25 --noise 0.0 > synth.csv
//! ./sonic-sw --log synth.csv --water-top 2120 --water-base 2200
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sonic_sw::config::defaults::SYNTHETIC_DEFAULT_SEED;
use sonic_sw::synthetic::{to_csv, SyntheticConfig, SyntheticLogGenerator};
use sonic_sw::EstimatorConfig;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "synthetic-log")]
#[command(about = "Synthetic DTC/DTS log generator with known water saturation")]
#[command(version)]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = SYNTHETIC_DEFAULT_SEED)]
    seed: u64,

    /// Well name written into the log header
    #[arg(long, default_value = "SYNTH-1")]
    well: String,

    /// Profile top depth
    #[arg(long, default_value_t = 2000.0)]
    top: f64,

    /// Profile base depth
    #[arg(long, default_value_t = 2200.0)]
    base: f64,

    /// Sample interval
    #[arg(long, default_value_t = 0.5)]
    step: f64,

    /// Top of the hydrocarbon column
    #[arg(long, default_value_t = 2040.0)]
    hc_top: f64,

    /// Hydrocarbon-water contact; the water leg runs from here to --base
    #[arg(long, default_value_t = 2120.0)]
    contact: f64,

    /// Water saturation inside the hydrocarbon column
    #[arg(long, default_value_t = 0.3)]
    hc_sw: f64,

    /// DTC noise, 1σ in µs/ft (DTS noise is twice this)
    #[arg(long, default_value_t = 0.5)]
    noise: f64,

    /// Estimator config supplying fluid and matrix constants
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Write the CSV here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let model = match &args.config {
        Some(path) => EstimatorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EstimatorConfig::load(),
    };

    let config = SyntheticConfig {
        well: args.well,
        seed: args.seed,
        top: args.top,
        base: args.base,
        step: args.step,
        hc_top: args.hc_top,
        contact: args.contact,
        hc_sw: args.hc_sw,
        dtc_noise: args.noise,
        dts_noise: 2.0 * args.noise,
        ..SyntheticConfig::default()
    };
    let (water_top, water_base) = config.water_leg();

    let log = SyntheticLogGenerator::new(config, model)
        .context("Invalid synthetic profile")?
        .generate();
    let csv = to_csv(&log);

    match &args.output {
        Some(path) => {
            std::fs::write(path, csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Synthetic log written");
        }
        None => print!("{csv}"),
    }

    info!(
        well = %log.well,
        samples = log.len(),
        seed = args.seed,
        water_top,
        water_base,
        "Calibrate sonic-sw on the water leg"
    );
    Ok(())
}
