//! Statistical summaries of estimation runs

use statrs::statistics::Statistics;

use crate::types::{AccuracySummary, SaturationEstimate};

/// Compare estimates against ground truth.
///
/// Only estimates carrying `sw_true` count. Returns `None` when none do.
pub fn accuracy_summary(estimates: &[SaturationEstimate]) -> Option<AccuracySummary> {
    let errors: Vec<f64> = estimates.iter().filter_map(SaturationEstimate::error).collect();
    if errors.is_empty() {
        return None;
    }

    let bias = errors.iter().mean();
    let mae = errors.iter().map(|e| e.abs()).mean();
    let rmse = errors.iter().quadratic_mean();
    // Sample std dev is undefined for a single value
    let error_std = if errors.len() > 1 { errors.iter().std_dev() } else { 0.0 };

    Some(AccuracySummary {
        count: errors.len(),
        bias,
        mae,
        rmse,
        error_std,
    })
}
