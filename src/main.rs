//! sonic-sw - Water saturation from sonic logs
//!
//! Calibrates the dry-frame bulk modulus on a known water-bearing interval,
//! then inverts Gassmann + Wood for Sw at every depth of the log.
//!
//! # Usage
//!
//! ```bash
//! # Built-in demonstration (illustrative two-zone case + synthetic profile)
//! sonic-sw
//!
//! # Estimate a LAS file, water zone 2120-2200 m, JSON report
//! sonic-sw --log well.las --water-top 2120 --water-base 2200 --format json
//!
//! # Reproduce a synthetic log from synthetic-log
//! synthetic-log --seed 7 > synth.csv
//! sonic-sw --log synth.csv --water-top 2120 --water-base 2200
//! ```
//!
//! # Environment Variables
//!
//! - `SONIC_SW_CONFIG`: Path to the estimator TOML config
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use sonic_sw::config::defaults::SYNTHETIC_DEFAULT_SEED;
use sonic_sw::report::{self, ReportFormat};
use sonic_sw::synthetic::{generate_log, SyntheticConfig};
use sonic_sw::{
    acquisition, CalibrationZone, EstimationRun, EstimatorConfig, InversionMethod, LogSample,
    MalformedRowPolicy, SaturationEstimator, WellLog,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "sonic-sw")]
#[command(about = "Water saturation from DTC/DTS sonic logs (Gassmann + Wood)")]
#[command(version)]
struct CliArgs {
    /// Well log to process (CSV, or LAS 2.0 by .las extension).
    /// Runs the built-in demonstration when omitted.
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Top of the 100% water-bearing calibration interval
    #[arg(long, requires = "log")]
    water_top: Option<f64>,

    /// Base of the 100% water-bearing calibration interval
    #[arg(long, requires = "log")]
    water_base: Option<f64>,

    /// Estimator config file (overrides SONIC_SW_CONFIG and ./sonic_sw.toml)
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Report format: table, csv or json
    #[arg(short, long, default_value = "table")]
    format: ReportFormat,

    /// Write the report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Sw inversion method: analytic or bisection
    #[arg(long)]
    method: Option<InversionMethod>,

    /// Abort on the first malformed row or sample instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Seed for the demonstration's synthetic profile
    #[arg(long, default_value_t = SYNTHETIC_DEFAULT_SEED)]
    seed: u64,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

// ============================================================================
// Configuration
// ============================================================================

fn load_config(args: &CliArgs) -> Result<EstimatorConfig> {
    let mut config = match &args.config {
        Some(path) => EstimatorConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EstimatorConfig::load(),
    };

    if let Some(method) = args.method {
        config.solver.method = method;
    }
    if args.strict {
        config.input.malformed_rows = MalformedRowPolicy::Fail;
    }
    if args.water_top.is_some() {
        config.calibration.water_top = args.water_top;
    }
    if args.water_base.is_some() {
        config.calibration.water_base = args.water_base;
    }

    // Overrides can break invariants the file satisfied
    config.validate().context("Invalid configuration after command-line overrides")?;
    Ok(config)
}

// ============================================================================
// Runs
// ============================================================================

fn run_log(estimator: &SaturationEstimator, path: &Path) -> Result<EstimationRun> {
    let config = estimator.config();
    let log = acquisition::read_log(path, config.input.malformed_rows)
        .with_context(|| format!("Failed to read log {}", path.display()))?;

    let (top, base) = match (config.calibration.water_top, config.calibration.water_base) {
        (Some(top), Some(base)) => (top, base),
        _ => {
            return Err(anyhow!(
                "No calibration interval: pass --water-top/--water-base \
                 or set [calibration] in the config"
            ))
        }
    };

    let zone = CalibrationZone::from_interval(&log, top, base)
        .with_context(|| format!("Calibration interval {top}-{base} in well {}", log.well))?;
    let mut run = estimator.run(&log, &zone).context("Saturation estimation failed")?;
    run.skipped += log.skipped_rows;
    Ok(run)
}

/// Water zone and target zone of the illustrative workflow.
fn illustrative_log() -> WellLog {
    WellLog::new(
        "ILLUSTRATIVE",
        vec![
            LogSample::new(2000.0, 90.0, 170.0, 0.25, 0.0).with_rhob(2.32),
            LogSample::new(2100.0, 92.0, 170.0, 0.25, 0.0).with_rhob(2.30),
        ],
    )
}

fn run_demo(estimator: &SaturationEstimator, seed: u64) -> Result<Vec<EstimationRun>> {
    info!("No log given, running built-in demonstration");

    let illustrative = illustrative_log();
    let zone = CalibrationZone::from_interval(&illustrative, 2000.0, 2000.0)?;
    let first = estimator.run(&illustrative, &zone).context("Illustrative example failed")?;

    let synth_config = SyntheticConfig {
        seed,
        ..SyntheticConfig::default()
    };
    let synthetic = generate_log(&synth_config, estimator.config())?;
    let (top, base) = synth_config.water_leg();
    let zone = CalibrationZone::from_interval(&synthetic, top, base)?;
    let second = estimator.run(&synthetic, &zone).context("Synthetic profile failed")?;

    Ok(vec![first, second])
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Reports go to stdout, logs to stderr
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if args.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = load_config(&args)?;
    info!(
        well = %config.well.name,
        method = ?config.solver.method,
        malformed_rows = ?config.input.malformed_rows,
        "Estimator configured"
    );
    let estimator = SaturationEstimator::new(config);

    let runs = match &args.log {
        Some(path) => vec![run_log(&estimator, path)?],
        None => run_demo(&estimator, args.seed)?,
    };

    let output = report::render_all(&runs, args.format).context("Failed to render report")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!(path = %path.display(), runs = runs.len(), "Report written");
        }
        None => print!("{output}"),
    }

    Ok(())
}
