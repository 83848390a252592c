//! Shared data structures for sonic saturation estimation
//!
//! - `LogSample` / `WellLog`: input log suite
//! - `CalibrationZone` / `CalibrationResult`: the water-zone fit
//! - `SaturationEstimate` / `EstimationRun`: per-depth outputs

mod estimate;
mod log;

pub use estimate::*;
pub use log::*;
