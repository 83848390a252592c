//! Estimator Configuration Module
//!
//! Rock and fluid constants loaded from TOML, replacing the hardcoded values
//! of the illustrative workflow with operator-tunable ones.
//!
//! ## Loading Order
//!
//! 1. `SONIC_SW_CONFIG` environment variable (path to TOML file)
//! 2. `sonic_sw.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ```ignore
//! let config = EstimatorConfig::load();
//! let estimator = SaturationEstimator::new(config);
//! ```

mod estimator_config;
pub mod defaults;
pub mod validation;

pub use estimator_config::*;
