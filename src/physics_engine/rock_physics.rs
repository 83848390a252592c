//! Rock-physics relations for sonic fluid substitution
//!
//! Key relations:
//! - Sonic slowness to velocity and elastic moduli
//! - Gassmann forward model and its closed-form inversion for Kf
//! - Wood (Reuss) fluid mixing and its inversion for Sw
//! - Voigt-Reuss-Hill matrix modulus from shale volume
//!
//! All moduli are in GPa, densities in g/cc, slowness in µs/ft.

use super::EstimationError;
use crate::config::defaults::{KGM3_PER_GCC, PA_PER_GPA, SLOWNESS_TO_VELOCITY};
use crate::config::{FluidConfig, MatrixConfig};

// ============================================================================
// Sonic Conversions
// ============================================================================

/// Convert sonic slowness logs (µs/ft) to Vp, Vs in m/s.
pub fn velocities_from_sonic(dtc_us_per_ft: f64, dts_us_per_ft: f64) -> (f64, f64) {
    (
        SLOWNESS_TO_VELOCITY / dtc_us_per_ft,
        SLOWNESS_TO_VELOCITY / dts_us_per_ft,
    )
}

/// Shear modulus μ = ρ·Vs² (GPa).
pub fn shear_modulus_from_sonic(dts_us_per_ft: f64, rho_gcc: f64) -> f64 {
    let vs = SLOWNESS_TO_VELOCITY / dts_us_per_ft;
    rho_gcc * KGM3_PER_GCC * vs * vs / PA_PER_GPA
}

/// Saturated bulk modulus from sonic and density.
///
/// Formula: Ksat = ρ·(Vp² − 4/3·Vs²)
///
/// Negative when Vp/Vs < √(4/3); callers treat that as a stiffness below any
/// fluid-substitution bound.
pub fn ksat_from_sonic(dtc_us_per_ft: f64, dts_us_per_ft: f64, rho_gcc: f64) -> f64 {
    let (vp, vs) = velocities_from_sonic(dtc_us_per_ft, dts_us_per_ft);
    rho_gcc * KGM3_PER_GCC * (vp * vp - (4.0 / 3.0) * vs * vs) / PA_PER_GPA
}

/// Compressional slowness (µs/ft) implied by bulk and shear moduli.
///
/// Formula: Vp = √((K + 4/3·μ) / ρ)
pub fn dtc_from_moduli(k_gpa: f64, mu_gpa: f64, rho_gcc: f64) -> f64 {
    let m_pa = (k_gpa + (4.0 / 3.0) * mu_gpa) * PA_PER_GPA;
    let vp = (m_pa / (rho_gcc * KGM3_PER_GCC)).sqrt();
    SLOWNESS_TO_VELOCITY / vp
}

/// Shear slowness (µs/ft) implied by a shear modulus.
pub fn dts_from_modulus(mu_gpa: f64, rho_gcc: f64) -> f64 {
    let vs = (mu_gpa * PA_PER_GPA / (rho_gcc * KGM3_PER_GCC)).sqrt();
    SLOWNESS_TO_VELOCITY / vs
}

// ============================================================================
// Gassmann
// ============================================================================

/// Gassmann forward model.
///
/// Formula: Ksat = Kdry + (1 − Kdry/Km)² / (φ/Kf + (1 − φ)/Km − Kdry/Km²)
///
/// Monotone increasing in both `kdry` (for `kdry < km`) and `kf`.
pub fn gassmann_ksat(kdry: f64, km: f64, phi: f64, kf: f64) -> f64 {
    let a = 1.0 - kdry / km;
    kdry + (a * a) / (phi / kf + (1.0 - phi) / km - kdry / (km * km))
}

/// Closed-form inversion of Gassmann for the pore-fluid modulus.
///
/// Fails when `ksat == kdry` (no fluid signal) or the inversion term vanishes.
pub fn invert_fluid_modulus(
    ksat: f64,
    kdry: f64,
    km: f64,
    phi: f64,
) -> Result<f64, EstimationError> {
    let a = (1.0 - kdry / km).powi(2);
    let b = ksat - kdry;
    if b.abs() < f64::EPSILON {
        return Err(EstimationError::Numerical(format!(
            "Ksat ({ksat:.4}) equals Kdry ({kdry:.4}); fluid inversion unstable"
        )));
    }
    let term = a / b - (1.0 - phi) / km + kdry / (km * km);
    if term.abs() < f64::EPSILON {
        return Err(EstimationError::Numerical(
            "fluid inversion term vanished; check rock/fluid assumptions".to_string(),
        ));
    }
    let kf = phi / term;
    if !kf.is_finite() {
        return Err(EstimationError::Numerical(format!("non-finite Kf from Ksat {ksat:.4}")));
    }
    Ok(kf)
}

// ============================================================================
// Wood Mixing
// ============================================================================

/// Effective modulus of a brine/hydrocarbon mixture (Reuss average).
///
/// Formula: 1/Kf = Sw/Kw + (1 − Sw)/Khc
pub fn wood_fluid_modulus(sw: f64, kw: f64, khc: f64) -> f64 {
    1.0 / (sw / kw + (1.0 - sw) / khc)
}

/// Invert Wood's law for water saturation. Not clamped.
///
/// Formula: Sw = (1/Kf − 1/Khc) / (1/Kw − 1/Khc)
pub fn sw_from_fluid_modulus(kf: f64, kw: f64, khc: f64) -> Result<f64, EstimationError> {
    let denominator = 1.0 / kw - 1.0 / khc;
    if denominator.abs() < f64::EPSILON {
        return Err(EstimationError::Numerical(
            "brine and hydrocarbon moduli are equal; saturation is unresolvable".to_string(),
        ));
    }
    Ok((1.0 / kf - 1.0 / khc) / denominator)
}

// ============================================================================
// Matrix & Density
// ============================================================================

/// Mineral bulk modulus from shale volume, Voigt-Reuss-Hill average of
/// quartz and clay end-members.
pub fn matrix_bulk_modulus(vsh: f64, matrix: &MatrixConfig) -> f64 {
    let kq = matrix.quartz_modulus_gpa;
    let kc = matrix.clay_modulus_gpa;
    let voigt = (1.0 - vsh) * kq + vsh * kc;
    let reuss = 1.0 / ((1.0 - vsh) / kq + vsh / kc);
    0.5 * (voigt + reuss)
}

/// Grain density from shale volume (linear mix).
pub fn matrix_density(vsh: f64, matrix: &MatrixConfig) -> f64 {
    (1.0 - vsh) * matrix.quartz_density_gcc + vsh * matrix.clay_density_gcc
}

/// Bulk density of a rock with pore fluid at saturation `sw`.
pub fn bulk_density(
    phi: f64,
    vsh: f64,
    sw: f64,
    matrix: &MatrixConfig,
    fluids: &FluidConfig,
) -> f64 {
    let rho_fluid = sw * fluids.brine_density_gcc + (1.0 - sw) * fluids.hydrocarbon_density_gcc;
    (1.0 - phi) * matrix_density(vsh, matrix) + phi * rho_fluid
}
