//! Synthetic sonic logs
//!
//! Generates a depth profile through a sand with a hydrocarbon column over a
//! water leg, using the same Gassmann + Wood forward model the estimator
//! inverts. With zero noise the estimator recovers `sw_true` exactly, which
//! makes these logs the reference case for regression tests and the demo.
//!
//! Profile layout (depth increasing downwards):
//! - `top` .. `hc_top`: water-bearing sand
//! - `hc_top` .. `contact`: hydrocarbon column at `hc_sw`
//! - `contact` .. `base`: water leg, used as the calibration zone

use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::defaults::{SYNTHETIC_DEFAULT_SEED, SYNTHETIC_KDRY_GPA, SYNTHETIC_MU_GPA};
use crate::config::EstimatorConfig;
use crate::physics_engine::rock_physics::{
    bulk_density, dtc_from_moduli, dts_from_modulus, gassmann_ksat, matrix_bulk_modulus,
    wood_fluid_modulus,
};
use crate::physics_engine::EstimationError;
use crate::types::{LogSample, WellLog};

/// Porosity is kept inside this range after jitter.
const PHI_FLOOR: f64 = 0.02;
const PHI_CEILING: f64 = 0.45;

/// Synthetic profile parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub well: String,
    pub seed: u64,
    /// Profile top (m)
    pub top: f64,
    /// Profile base (m)
    pub base: f64,
    /// Sample interval (m)
    pub step: f64,
    /// Top of the hydrocarbon column (m)
    pub hc_top: f64,
    /// Hydrocarbon-water contact (m)
    pub contact: f64,
    /// Water saturation inside the hydrocarbon column
    pub hc_sw: f64,
    /// Porosity at `top`, trending linearly to `phi_base`
    pub phi_top: f64,
    pub phi_base: f64,
    /// Standard deviation of porosity scatter around the trend
    pub phi_jitter: f64,
    pub vsh_min: f64,
    pub vsh_max: f64,
    /// Gaussian noise on DTC (µs/ft, 1σ)
    pub dtc_noise: f64,
    /// Gaussian noise on DTS (µs/ft, 1σ)
    pub dts_noise: f64,
    pub kdry_gpa: f64,
    pub mu_gpa: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            well: "SYNTH-1".to_string(),
            seed: SYNTHETIC_DEFAULT_SEED,
            top: 2000.0,
            base: 2200.0,
            step: 0.5,
            hc_top: 2040.0,
            contact: 2120.0,
            hc_sw: 0.3,
            phi_top: 0.28,
            phi_base: 0.22,
            phi_jitter: 0.01,
            vsh_min: 0.0,
            vsh_max: 0.15,
            dtc_noise: 0.5,
            dts_noise: 1.0,
            kdry_gpa: SYNTHETIC_KDRY_GPA,
            mu_gpa: SYNTHETIC_MU_GPA,
        }
    }
}

impl SyntheticConfig {
    /// Same profile with all sonic noise removed.
    pub fn noise_free(mut self) -> Self {
        self.dtc_noise = 0.0;
        self.dts_noise = 0.0;
        self
    }

    /// Depth interval of the water leg below the contact.
    pub fn water_leg(&self) -> (f64, f64) {
        (self.contact, self.base)
    }

    pub fn sample_count(&self) -> usize {
        ((self.base - self.top) / self.step).floor() as usize + 1
    }

    /// Check parameters against the rock model they will be run through.
    pub fn validate(&self, model: &EstimatorConfig) -> Result<(), EstimationError> {
        let mut errors = Vec::new();

        if !(self.top.is_finite() && self.base.is_finite() && self.top < self.base) {
            errors.push(format!("top ({}) must be above base ({})", self.top, self.base));
        }
        if !(self.step > 0.0 && self.step.is_finite()) {
            errors.push(format!("step must be positive, got {}", self.step));
        }
        if !(self.hc_top <= self.contact && self.contact < self.base) {
            errors.push(format!(
                "need hc_top ({}) <= contact ({}) < base ({}) so a water leg exists",
                self.hc_top, self.contact, self.base
            ));
        }
        if !(0.0..=1.0).contains(&self.hc_sw) {
            errors.push(format!("hc_sw must be in [0, 1], got {}", self.hc_sw));
        }
        for (name, phi) in [("phi_top", self.phi_top), ("phi_base", self.phi_base)] {
            if !(PHI_FLOOR..=PHI_CEILING).contains(&phi) {
                errors.push(format!("{name} must be in [{PHI_FLOOR}, {PHI_CEILING}], got {phi}"));
            }
        }
        if !(0.0 <= self.vsh_min && self.vsh_min <= self.vsh_max && self.vsh_max <= 1.0) {
            errors.push(format!(
                "need 0 <= vsh_min ({}) <= vsh_max ({}) <= 1",
                self.vsh_min, self.vsh_max
            ));
        }
        for (name, sigma) in [
            ("phi_jitter", self.phi_jitter),
            ("dtc_noise", self.dtc_noise),
            ("dts_noise", self.dts_noise),
        ] {
            if !(sigma >= 0.0 && sigma.is_finite()) {
                errors.push(format!(
                    "{name} must be a non-negative standard deviation, got {sigma}"
                ));
            }
        }
        if self.mu_gpa <= 0.0 {
            errors.push(format!("mu_gpa must be positive, got {}", self.mu_gpa));
        }
        // Km falls with VSH, so the shaliest sample bounds the frame
        let km_min = matrix_bulk_modulus(self.vsh_max.clamp(0.0, 1.0), &model.matrix);
        if !(self.kdry_gpa > 0.0 && self.kdry_gpa < km_min) {
            errors.push(format!(
                "kdry_gpa must be in (0, {km_min:.3}) for the configured matrix, got {}",
                self.kdry_gpa
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EstimationError::InvalidInput(errors.join("; ")))
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Seeded forward-model log generator.
pub struct SyntheticLogGenerator {
    config: SyntheticConfig,
    model: EstimatorConfig,
    rng: StdRng,
    phi_scatter: Normal<f64>,
    dtc_noise: Normal<f64>,
    dts_noise: Normal<f64>,
}

impl SyntheticLogGenerator {
    pub fn new(config: SyntheticConfig, model: EstimatorConfig) -> Result<Self, EstimationError> {
        config.validate(&model)?;
        let normal = |sigma: f64| {
            Normal::new(0.0, sigma)
                .map_err(|e| EstimationError::InvalidInput(format!("noise σ {sigma}: {e}")))
        };
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            phi_scatter: normal(config.phi_jitter)?,
            dtc_noise: normal(config.dtc_noise)?,
            dts_noise: normal(config.dts_noise)?,
            config,
            model,
        })
    }

    /// Water saturation the profile assigns to `depth`.
    pub fn sw_at(&self, depth: f64) -> f64 {
        if depth >= self.config.hc_top && depth < self.config.contact {
            self.config.hc_sw
        } else {
            1.0
        }
    }

    fn phi_trend(&self, depth: f64) -> f64 {
        let span = self.config.base - self.config.top;
        let t = ((depth - self.config.top) / span).clamp(0.0, 1.0);
        self.config.phi_top + t * (self.config.phi_base - self.config.phi_top)
    }

    /// Forward-model one sample from its rock and fluid properties.
    fn forward(&self, depth: f64, phi: f64, vsh: f64, sw: f64) -> LogSample {
        let fluids = &self.model.fluids;
        let km = matrix_bulk_modulus(vsh, &self.model.matrix);
        let kf = wood_fluid_modulus(sw, fluids.brine_modulus_gpa, fluids.hydrocarbon_modulus_gpa);
        let ksat = gassmann_ksat(self.config.kdry_gpa, km, phi, kf);
        let rho = bulk_density(phi, vsh, sw, &self.model.matrix, fluids);

        LogSample::new(
            depth,
            dtc_from_moduli(ksat, self.config.mu_gpa, rho),
            dts_from_modulus(self.config.mu_gpa, rho),
            phi,
            vsh,
        )
        .with_rhob(rho)
        .with_sw_true(sw)
    }

    /// Generate the full profile.
    pub fn generate(&mut self) -> WellLog {
        let n = self.config.sample_count();
        let mut samples = Vec::with_capacity(n);

        for i in 0..n {
            let depth = self.config.top + i as f64 * self.config.step;
            let phi = (self.phi_trend(depth) + self.phi_scatter.sample(&mut self.rng))
                .clamp(PHI_FLOOR, PHI_CEILING);
            let vsh = if self.config.vsh_max > self.config.vsh_min {
                self.rng.gen_range(self.config.vsh_min..self.config.vsh_max)
            } else {
                self.config.vsh_min
            };
            let sw = self.sw_at(depth);

            let mut sample = self.forward(depth, phi, vsh, sw);
            // Noise is floored well above zero so noisy rows stay physical
            sample.dtc = (sample.dtc + self.dtc_noise.sample(&mut self.rng)).max(1.0);
            sample.dts = (sample.dts + self.dts_noise.sample(&mut self.rng)).max(1.0);
            samples.push(sample);
        }

        debug!(
            well = %self.config.well,
            samples = samples.len(),
            seed = self.config.seed,
            "Generated synthetic log"
        );
        WellLog::new(self.config.well.clone(), samples)
    }
}

/// Generate a synthetic log in one call.
pub fn generate_log(
    config: &SyntheticConfig,
    model: &EstimatorConfig,
) -> Result<WellLog, EstimationError> {
    Ok(SyntheticLogGenerator::new(config.clone(), model.clone())?.generate())
}

/// Render a log as CSV readable by `acquisition::parse_csv_log`.
pub fn to_csv(log: &WellLog) -> String {
    let mut out = format!("# well: {}\nDEPTH,DTC,DTS,PHI,VSH,RHOB,SW_TRUE\n", log.well);
    for s in &log.samples {
        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            s.depth,
            s.dtc,
            s.dts,
            s.phi,
            s.vsh,
            opt(s.rhob),
            opt(s.sw_true)
        ));
    }
    out
}
