//! Well-log sample types

use serde::{Deserialize, Serialize};

/// A single depth sample from the sonic/porosity log suite.
///
/// Immutable once read. Sonic values are transit times in µs/ft, porosity and
/// shale volume are fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogSample {
    /// Measured depth (log units, usually ft or m)
    pub depth: f64,
    /// Compressional slowness (µs/ft)
    pub dtc: f64,
    /// Shear slowness (µs/ft)
    pub dts: f64,
    /// Porosity fraction
    pub phi: f64,
    /// Shale volume fraction
    #[serde(default)]
    pub vsh: f64,
    /// Bulk density (g/cc); modelled from porosity when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhob: Option<f64>,
    /// Ground-truth water saturation, for synthetic or cored intervals only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sw_true: Option<f64>,
}

impl LogSample {
    pub fn new(depth: f64, dtc: f64, dts: f64, phi: f64, vsh: f64) -> Self {
        Self {
            depth,
            dtc,
            dts,
            phi,
            vsh,
            rhob: None,
            sw_true: None,
        }
    }

    pub fn with_rhob(mut self, rhob: f64) -> Self {
        self.rhob = Some(rhob);
        self
    }

    pub fn with_sw_true(mut self, sw_true: f64) -> Self {
        self.sw_true = Some(sw_true);
        self
    }

    /// Check the physical constraints on every field.
    ///
    /// Returns a description of the first violated constraint.
    pub fn check(&self) -> Result<(), String> {
        if !self.depth.is_finite() {
            return Err(format!("depth {} is not finite", self.depth));
        }
        if !(self.dtc.is_finite() && self.dtc > 0.0) {
            return Err(format!("DTC {} at depth {} must be positive", self.dtc, self.depth));
        }
        if !(self.dts.is_finite() && self.dts > 0.0) {
            return Err(format!("DTS {} at depth {} must be positive", self.dts, self.depth));
        }
        if !(self.phi > 0.0 && self.phi <= 1.0) {
            return Err(format!("PHI {} at depth {} must be in (0, 1]", self.phi, self.depth));
        }
        if !(0.0..=1.0).contains(&self.vsh) {
            return Err(format!("VSH {} at depth {} must be in [0, 1]", self.vsh, self.depth));
        }
        if let Some(rhob) = self.rhob {
            if !(rhob.is_finite() && rhob > 0.0) {
                return Err(format!("RHOB {} at depth {} must be positive", rhob, self.depth));
            }
        }
        Ok(())
    }
}

/// An ordered log suite for one well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WellLog {
    /// Well name from the file header, or the file stem
    pub well: String,
    /// Samples in file order
    pub samples: Vec<LogSample>,
    /// Rows dropped while reading under the skip policy
    #[serde(default)]
    pub skipped_rows: usize,
    /// Depths of the skipped rows whose depth cell was readable
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_depths: Vec<f64>,
}

impl WellLog {
    pub fn new(well: impl Into<String>, samples: Vec<LogSample>) -> Self {
        Self {
            well: well.into(),
            samples,
            skipped_rows: 0,
            skipped_depths: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples with `top <= depth <= base`, in file order.
    pub fn interval(&self, top: f64, base: f64) -> Vec<LogSample> {
        let (top, base) = ordered(top, base);
        self.samples
            .iter()
            .filter(|s| s.depth >= top && s.depth <= base)
            .copied()
            .collect()
    }

    /// Depth range covered by the log, `None` when empty.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        let first = self.samples.first()?.depth;
        Some(self.samples.iter().fold((first, first), |(lo, hi), s| {
            (lo.min(s.depth), hi.max(s.depth))
        }))
    }

    /// True when at least one sample carries ground truth.
    pub fn has_truth(&self) -> bool {
        self.samples.iter().any(|s| s.sw_true.is_some())
    }
}

/// `(shallower, deeper)` regardless of argument order.
pub(crate) fn ordered(top: f64, base: f64) -> (f64, f64) {
    if top <= base {
        (top, base)
    } else {
        (base, top)
    }
}
