//! System-wide default constants.
//!
//! Unit conversions and demo parameters shared by the library and binaries.

// ============================================================================
// Units
// ============================================================================

/// Feet to metres.
pub const FT_TO_M: f64 = 0.3048;

/// Converts a slowness in µs/ft to a velocity in m/s: `v = SLOWNESS_TO_VELOCITY / dt`.
pub const SLOWNESS_TO_VELOCITY: f64 = FT_TO_M * 1.0e6;

/// Pascals per gigapascal.
pub const PA_PER_GPA: f64 = 1.0e9;

/// kg/m³ per g/cc.
pub const KGM3_PER_GCC: f64 = 1000.0;

// ============================================================================
// Estimation
// ============================================================================

/// Saturation tolerance within which a water-zone sample counts as recovered.
pub const WATER_RECOVERY_TOLERANCE: f64 = 0.02;

// ============================================================================
// Synthetic Logs
// ============================================================================

/// Default seed so repeated demo runs print identical tables.
pub const SYNTHETIC_DEFAULT_SEED: u64 = 42;

/// Dry-frame bulk modulus used by the synthetic generator (GPa).
pub const SYNTHETIC_KDRY_GPA: f64 = 12.6;

/// Dry-frame shear modulus used by the synthetic generator (GPa).
pub const SYNTHETIC_MU_GPA: f64 = 8.5;
