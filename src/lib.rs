//! sonic-sw: Water Saturation from Sonic Logs
//!
//! Estimates water saturation from compressional and shear sonic logs by
//! inverting Gassmann fluid substitution combined with Wood's mixing law.
//!
//! ## Architecture
//!
//! - **Acquisition**: CSV and LAS 2.0 log readers with curve-mnemonic aliasing
//! - **Physics Engine**: rock-physics relations, calibration of the dry-frame
//!   modulus on a water zone, per-depth Sw inversion
//! - **Synthetic**: seeded forward-model logs with known saturation
//! - **Report**: table, CSV and JSON rendering of a run
//!
//! ```ignore
//! let estimator = SaturationEstimator::new(EstimatorConfig::load());
//! let zone = CalibrationZone::from_interval(&log, 2120.0, 2200.0)?;
//! let run = estimator.run(&log, &zone)?;
//! ```

pub mod acquisition;
pub mod config;
pub mod physics_engine;
pub mod report;
pub mod synthetic;
pub mod types;

// Re-export configuration
pub use config::{EstimatorConfig, InversionMethod, MalformedRowPolicy};

// Re-export commonly used types
pub use types::{
    AccuracySummary, CalibrationResult, CalibrationZone, EstimationRun, LogSample,
    SaturationEstimate, WellLog,
};

// Re-export the estimator
pub use physics_engine::{EstimationError, SaturationEstimator};

// Re-export I/O
pub use acquisition::{read_log, LogReadError};
pub use report::ReportFormat;
pub use synthetic::{generate_log, SyntheticConfig};
