//! Calibration and estimation result types

use serde::{Deserialize, Serialize};

use super::log::ordered;
use super::{LogSample, WellLog};
use crate::physics_engine::EstimationError;

// ============================================================================
// Calibration Zone
// ============================================================================

/// A contiguous run of samples known to be 100% water-bearing.
///
/// Never empty: both constructors reject an empty selection.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationZone {
    samples: Vec<LogSample>,
    top: f64,
    base: f64,
}

impl CalibrationZone {
    /// Build a zone directly from samples.
    pub fn new(samples: Vec<LogSample>) -> Result<Self, EstimationError> {
        let first = samples.first().ok_or_else(|| {
            EstimationError::InvalidInput("calibration zone has no samples".to_string())
        })?;
        let (top, base) = samples.iter().fold((first.depth, first.depth), |(lo, hi), s| {
            (lo.min(s.depth), hi.max(s.depth))
        });
        Ok(Self { samples, top, base })
    }

    /// Select the samples of `log` between `top` and `base` (inclusive).
    ///
    /// The zone spans the requested interval. A row dropped while reading
    /// that falls inside it is `InvalidInput`: water-zone data is never
    /// silently thinned.
    pub fn from_interval(log: &WellLog, top: f64, base: f64) -> Result<Self, EstimationError> {
        let samples = log.interval(top, base);
        if samples.is_empty() {
            return Err(EstimationError::InvalidInput(format!(
                "no samples in water interval {top}-{base} of well '{}'",
                log.well
            )));
        }
        let (top, base) = ordered(top, base);
        let zone = Self { samples, top, base };
        if let Some(depth) = log.skipped_depths.iter().find(|d| zone.contains_depth(**d)) {
            return Err(EstimationError::InvalidInput(format!(
                "malformed row at depth {depth} lies inside water interval {top}-{base} \
                 of well '{}'",
                log.well
            )));
        }
        Ok(zone)
    }

    pub fn samples(&self) -> &[LogSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    /// True when `depth` falls inside the zone's depth span.
    pub fn contains_depth(&self, depth: f64) -> bool {
        depth >= self.top && depth <= self.base
    }
}

// ============================================================================
// Calibration Result
// ============================================================================

/// The fitted dry-frame constant plus fit diagnostics.
///
/// Only [`crate::physics_engine::SaturationEstimator::calibrate`] creates
/// one, so holding a `CalibrationResult` proves calibration happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationResult {
    /// Dry-frame bulk modulus (GPa), the single calibrated constant
    kdry_gpa: f64,
    /// Number of water-zone samples used
    pub sample_count: usize,
    /// Mean observed DTC over the zone (µs/ft)
    pub mean_dtc: f64,
    /// Mean porosity over the zone
    pub mean_phi: f64,
    /// RMS misfit between predicted and observed DTC over the zone (µs/ft)
    pub rms_dtc_misfit: f64,
    /// Bisection iterations used by the fit
    pub iterations: usize,
}

impl CalibrationResult {
    pub(crate) fn new(
        kdry_gpa: f64,
        sample_count: usize,
        mean_dtc: f64,
        mean_phi: f64,
        rms_dtc_misfit: f64,
        iterations: usize,
    ) -> Self {
        Self {
            kdry_gpa,
            sample_count,
            mean_dtc,
            mean_phi,
            rms_dtc_misfit,
            iterations,
        }
    }

    /// Dry-frame bulk modulus in GPa.
    pub fn kdry_gpa(&self) -> f64 {
        self.kdry_gpa
    }
}

// ============================================================================
// Per-depth Estimate
// ============================================================================

/// Water saturation estimate at one depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationEstimate {
    pub depth: f64,
    /// Estimated water saturation, always within [0, 1]
    pub sw_est: f64,
    /// Ground truth when the input sample carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_true: Option<f64>,
    /// Saturated bulk modulus from the sonic logs (GPa)
    pub ksat_gpa: f64,
    /// Inverted fluid bulk modulus (GPa); `None` when the estimate was clamped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kf_gpa: Option<f64>,
    /// The raw inversion fell outside [0, 1] and was clamped
    pub clamped: bool,
}

impl SaturationEstimate {
    /// Signed error against ground truth, when available.
    pub fn error(&self) -> Option<f64> {
        self.sw_true.map(|t| self.sw_est - t)
    }

    /// Hydrocarbon saturation `1 - Sw`.
    pub fn shc(&self) -> f64 {
        1.0 - self.sw_est
    }
}

// ============================================================================
// Run Summary
// ============================================================================

/// Agreement between estimates and ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    /// Samples that carried ground truth
    pub count: usize,
    /// Mean signed error (estimate - truth)
    pub bias: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Root-mean-square error
    pub rmse: f64,
    /// Standard deviation of the signed error
    pub error_std: f64,
}

/// Everything a single estimation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct EstimationRun {
    pub well: String,
    pub calibration: CalibrationResult,
    /// Calibration interval (top, base)
    pub water_zone: (f64, f64),
    pub estimates: Vec<SaturationEstimate>,
    /// Target samples skipped as malformed
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<AccuracySummary>,
}

impl EstimationRun {
    /// Mean estimated Sw over the run, `None` when nothing was estimated.
    pub fn mean_sw(&self) -> Option<f64> {
        if self.estimates.is_empty() {
            return None;
        }
        Some(self.estimates.iter().map(|e| e.sw_est).sum::<f64>() / self.estimates.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_zone_rejected() {
        let err = CalibrationZone::new(Vec::new()).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidInput(_)));
    }

    #[test]
    fn test_zone_span_from_samples() {
        let zone = CalibrationZone::new(vec![
            LogSample::new(1205.0, 90.0, 170.0, 0.25, 0.0),
            LogSample::new(1200.0, 90.0, 170.0, 0.25, 0.0),
        ])
        .expect("non-empty zone");
        assert_eq!(zone.top(), 1200.0);
        assert_eq!(zone.base(), 1205.0);
        assert!(zone.contains_depth(1203.0));
        assert!(!zone.contains_depth(1206.0));
    }

    #[test]
    fn test_zone_from_empty_interval_rejected() {
        let log = WellLog::new("T-1", vec![LogSample::new(1000.0, 90.0, 170.0, 0.25, 0.0)]);
        assert!(CalibrationZone::from_interval(&log, 2000.0, 2100.0).is_err());
        assert_eq!(
            CalibrationZone::from_interval(&log, 990.0, 1010.0)
                .expect("one sample")
                .len(),
            1
        );
    }

    #[test]
    fn test_zone_spans_requested_interval() {
        let log = WellLog::new("T-1", vec![LogSample::new(1000.0, 90.0, 170.0, 0.25, 0.0)]);
        let zone = CalibrationZone::from_interval(&log, 1010.0, 990.0).expect("one sample");
        assert_eq!((zone.top(), zone.base()), (990.0, 1010.0));
    }

    #[test]
    fn test_skipped_row_inside_interval_rejected() {
        let mut log = WellLog::new(
            "T-1",
            vec![
                LogSample::new(1000.0, 90.0, 170.0, 0.25, 0.0),
                LogSample::new(1002.0, 90.0, 170.0, 0.25, 0.0),
            ],
        );
        log.skipped_rows = 1;
        log.skipped_depths = vec![1001.0];
        let err = CalibrationZone::from_interval(&log, 1000.0, 1002.0).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidInput(_)));
        assert!(err.to_string().contains("1001"));
        // Outside the interval the skip is harmless
        assert!(CalibrationZone::from_interval(&log, 1002.0, 1005.0).is_ok());
    }

    #[test]
    fn test_estimate_error_against_truth() {
        let e = SaturationEstimate {
            depth: 1.0,
            sw_est: 0.6,
            sw_true: Some(0.5),
            ksat_gpa: 15.0,
            kf_gpa: Some(1.5),
            clamped: false,
        };
        assert!((e.error().expect("truth present") - 0.1).abs() < 1e-12);
        assert!((e.shc() - 0.4).abs() < 1e-12);
    }
}
