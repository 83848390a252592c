//! Physics Engine Module
//!
//! Deterministic rock-physics calculations for sonic saturation estimation.
//!
//! - `rock_physics` - Gassmann, Wood, sonic/moduli conversions, matrix mixing
//! - `solver` - bracketed bisection used for calibration and inversion
//! - `estimator` - `SaturationEstimator::calibrate()` / `estimate()`
//! - `metrics` - accuracy against ground truth

pub mod estimator;
pub mod metrics;
pub mod rock_physics;
pub mod solver;

pub use estimator::SaturationEstimator;
pub use metrics::accuracy_summary;
pub use rock_physics::{
    bulk_density, dtc_from_moduli, dts_from_modulus, gassmann_ksat, invert_fluid_modulus,
    ksat_from_sonic, matrix_bulk_modulus, matrix_density, shear_modulus_from_sonic,
    sw_from_fluid_modulus, velocities_from_sonic, wood_fluid_modulus,
};
pub use solver::{Bisection, Root};

use thiserror::Error;

/// Errors from calibration and estimation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstimationError {
    /// Missing or non-physical input values, or an empty calibration set
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Root-find failed to bracket or converge, or an intermediate went non-finite
    #[error("Numerical error: {0}")]
    Numerical(String),
}

impl EstimationError {
    /// The message without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidInput(msg) | Self::Numerical(msg) => msg,
        }
    }
}
