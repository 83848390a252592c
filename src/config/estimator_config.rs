//! Estimator Configuration - rock and fluid constants as operator-tunable TOML values
//!
//! Every constant the rock-physics relations need is a field in this module.
//! Each struct implements `Default` with the illustrative North Sea sandstone
//! values, so a run with no config file behaves like the embedded demo.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::validation;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SONIC_SW_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "sonic_sw.toml";

// ============================================================================
// Config Provenance
// ============================================================================

/// Dotted key paths the user's TOML file set explicitly.
///
/// After deserialization every `#[serde(default)]` field has a value, so this
/// is the only record of which values came from the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvenance {
    pub explicit_keys: HashSet<String>,
}

impl ConfigProvenance {
    /// Example: `provenance.is_user_set("fluids.brine_modulus_gpa")`
    pub fn is_user_set(&self, dotted_key: &str) -> bool {
        self.explicit_keys.contains(dotted_key)
    }
}

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a saturation run.
///
/// Load with `EstimatorConfig::load()` which searches:
/// 1. `$SONIC_SW_CONFIG` env var
/// 2. `./sonic_sw.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Well identification
    #[serde(default)]
    pub well: WellInfo,

    /// Pore-fluid properties
    #[serde(default)]
    pub fluids: FluidConfig,

    /// Mineral end-member properties
    #[serde(default)]
    pub matrix: MatrixConfig,

    /// Water-zone interval used for calibration
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Root-finder bounds and inversion method
    #[serde(default)]
    pub solver: SolverConfig,

    /// Log reading behaviour
    #[serde(default)]
    pub input: InputConfig,
}

impl EstimatorConfig {
    /// Load configuration using the standard search order, falling back to
    /// defaults when a file is missing or invalid.
    pub fn load() -> Self {
        Self::load_with_provenance().0
    }

    /// Same search order as `load()`, also returning which keys were set.
    pub fn load_with_provenance() -> (Self, ConfigProvenance) {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file_with_provenance(&p) {
                    Ok((config, provenance)) => {
                        info!(
                            path = %p.display(),
                            well = %config.well.name,
                            "Loaded estimator config from {CONFIG_ENV_VAR}"
                        );
                        return (config, provenance);
                    }
                    Err(e) => {
                        warn!(
                            path = %p.display(),
                            error = %e,
                            "Failed to load config from {CONFIG_ENV_VAR}, falling back"
                        );
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file_with_provenance(&local) {
                Ok((config, provenance)) => {
                    info!(
                        well = %config.well.name,
                        "Loaded estimator config from ./{LOCAL_CONFIG_FILE}"
                    );
                    return (config, provenance);
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        (Self::default(), ConfigProvenance::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let (config, _provenance) = Self::load_from_file_with_provenance(path)?;
        Ok(config)
    }

    /// Load from a specific TOML file path, also returning provenance.
    pub fn load_from_file_with_provenance(
        path: &Path,
    ) -> Result<(Self, ConfigProvenance), ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let (config, provenance) = Self::from_toml_str(&contents)
            .map_err(|e| match e {
                ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
                other => other,
            })?;
        Ok((config, provenance))
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings, never rejected.
    pub fn from_toml_str(contents: &str) -> Result<(Self, ConfigProvenance), ConfigError> {
        for w in &validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let provenance = ConfigProvenance {
            explicit_keys: contents
                .parse::<toml::Value>()
                .map(|v| validation::walk_toml_keys(&v, "").into_iter().collect())
                .unwrap_or_default(),
        };

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok((config, provenance))
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Write the config to `path`, e.g. to seed a new `sonic_sw.toml`.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Estimator config saved");
        Ok(())
    }

    /// Validate all constants for physical and internal consistency.
    ///
    /// Rules:
    /// - Moduli and densities must be finite and positive
    /// - Brine must be stiffer than the hydrocarbon phase
    /// - Solver tolerance must be positive, iterations > 0
    /// - Calibration top must not lie below its base
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (mut errors, range_warnings) = validation::validate_physical_ranges(self);
        for w in &range_warnings {
            warn!("{}", w);
        }

        let f = &self.fluids;
        if f.brine_modulus_gpa.is_finite()
            && f.hydrocarbon_modulus_gpa.is_finite()
            && f.brine_modulus_gpa <= f.hydrocarbon_modulus_gpa
        {
            errors.push(format!(
                "fluids: brine_modulus_gpa ({:.3}) must exceed hydrocarbon_modulus_gpa ({:.3})",
                f.brine_modulus_gpa, f.hydrocarbon_modulus_gpa
            ));
        }

        if let (Some(top), Some(base)) = (self.calibration.water_top, self.calibration.water_base) {
            if top > base {
                errors.push(format!(
                    "calibration: water_top ({top}) must not be deeper than water_base ({base})"
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({path}): {err}", path = .0.display(), err = .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({path}): {err}", path = .0.display(), err = .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Well Info
// ============================================================================

/// Identification metadata, shown in logs and reports only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellInfo {
    #[serde(default = "default_well_name")]
    pub name: String,

    #[serde(default)]
    pub field: String,
}

fn default_well_name() -> String {
    "DEFAULT".to_string()
}

impl Default for WellInfo {
    fn default() -> Self {
        Self {
            name: default_well_name(),
            field: String::new(),
        }
    }
}

// ============================================================================
// Fluids
// ============================================================================

/// Pore-fluid bulk moduli and densities at reservoir conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidConfig {
    /// Brine bulk modulus at reservoir P-T-salinity (GPa)
    #[serde(default = "default_brine_modulus")]
    pub brine_modulus_gpa: f64,

    /// Hydrocarbon bulk modulus (GPa). ~0.9 for live oil, ~0.05 for gas.
    #[serde(default = "default_hc_modulus")]
    pub hydrocarbon_modulus_gpa: f64,

    /// Brine density (g/cc)
    #[serde(default = "default_brine_density")]
    pub brine_density_gcc: f64,

    /// Hydrocarbon density (g/cc)
    #[serde(default = "default_hc_density")]
    pub hydrocarbon_density_gcc: f64,
}

fn default_brine_modulus() -> f64 {
    2.6
}
fn default_hc_modulus() -> f64 {
    0.9
}
fn default_brine_density() -> f64 {
    1.03
}
fn default_hc_density() -> f64 {
    0.80
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            brine_modulus_gpa: default_brine_modulus(),
            hydrocarbon_modulus_gpa: default_hc_modulus(),
            brine_density_gcc: default_brine_density(),
            hydrocarbon_density_gcc: default_hc_density(),
        }
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// Mineral end-members mixed by VSH into the matrix modulus and grain density.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Quartz bulk modulus (GPa)
    #[serde(default = "default_quartz_modulus")]
    pub quartz_modulus_gpa: f64,

    /// Clay bulk modulus (GPa)
    #[serde(default = "default_clay_modulus")]
    pub clay_modulus_gpa: f64,

    /// Quartz grain density (g/cc)
    #[serde(default = "default_quartz_density")]
    pub quartz_density_gcc: f64,

    /// Clay grain density (g/cc)
    #[serde(default = "default_clay_density")]
    pub clay_density_gcc: f64,
}

fn default_quartz_modulus() -> f64 {
    37.0
}
fn default_clay_modulus() -> f64 {
    21.0
}
fn default_quartz_density() -> f64 {
    2.65
}
fn default_clay_density() -> f64 {
    2.70
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            quartz_modulus_gpa: default_quartz_modulus(),
            clay_modulus_gpa: default_clay_modulus(),
            quartz_density_gcc: default_quartz_density(),
            clay_density_gcc: default_clay_density(),
        }
    }
}

// ============================================================================
// Calibration
// ============================================================================

/// Water-bearing interval used to fit the dry-frame modulus.
///
/// Both bounds are optional here; the CLI flags override them and a run
/// without either fails before any estimate is produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_top: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_base: Option<f64>,
}

// ============================================================================
// Solver
// ============================================================================

/// How saturation is recovered from the fluid modulus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionMethod {
    /// Closed-form Gassmann inversion for Kf followed by the inverse Wood law
    #[default]
    Analytic,
    /// Bisection on Sw in [0, 1] against the forward model
    Bisection,
}

impl std::str::FromStr for InversionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "analytic" => Ok(Self::Analytic),
            "bisection" => Ok(Self::Bisection),
            other => Err(format!("unknown inversion method '{other}' (analytic|bisection)")),
        }
    }
}

/// Root-finder bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub method: InversionMethod,

    /// Maximum bisection steps before a `Numerical` error
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Bracket width at which bisection stops
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_max_iterations() -> usize {
    200
}
fn default_tolerance() -> f64 {
    1e-10
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: InversionMethod::default(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

// ============================================================================
// Input
// ============================================================================

/// What to do with a target row that fails the physical checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Drop the row with a warning and keep going
    #[default]
    Skip,
    /// Abort the run on the first malformed row
    Fail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub malformed_rows: MalformedRowPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = EstimatorConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: EstimatorConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.fluids.brine_modulus_gpa, 2.6);
        assert_eq!(config.fluids.hydrocarbon_modulus_gpa, 0.9);
        assert_eq!(config.matrix.quartz_modulus_gpa, 37.0);
        assert_eq!(config.solver.method, InversionMethod::Analytic);
        assert_eq!(config.input.malformed_rows, MalformedRowPolicy::Skip);
        assert!(config.calibration.water_top.is_none());
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[well]
name = "Test-Well-1"

[fluids]
hydrocarbon_modulus_gpa = 0.05

[solver]
method = "bisection"

[input]
malformed_rows = "fail"
"#;
        let (config, provenance) =
            EstimatorConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.well.name, "Test-Well-1");
        assert_eq!(config.fluids.hydrocarbon_modulus_gpa, 0.05);
        assert_eq!(config.solver.method, InversionMethod::Bisection);
        assert_eq!(config.input.malformed_rows, MalformedRowPolicy::Fail);
        // Non-overridden values retain defaults
        assert_eq!(config.fluids.brine_modulus_gpa, 2.6);
        assert!(provenance.is_user_set("fluids.hydrocarbon_modulus_gpa"));
        assert!(!provenance.is_user_set("fluids.brine_modulus_gpa"));
    }

    #[test]
    fn test_validation_catches_inverted_fluids() {
        let mut config = EstimatorConfig::default();
        config.fluids.hydrocarbon_modulus_gpa = 3.0;
        let result = config.validate();
        assert!(result.is_err(), "Hydrocarbon stiffer than brine should fail");
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("brine_modulus_gpa")));
        }
    }

    #[test]
    fn test_validation_catches_inverted_interval() {
        let mut config = EstimatorConfig::default();
        config.calibration.water_top = Some(2100.0);
        config.calibration.water_base = Some(2000.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_value_is_parse_error() {
        let result = EstimatorConfig::from_toml_str("[solver]\nmethod = \"newton\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_, _))));
    }

    #[test]
    fn test_roundtrip_toml() {
        let mut original = EstimatorConfig::default();
        original.calibration.water_top = Some(2050.0);
        let toml_str = original.to_toml().expect("serialization should work");
        let roundtripped: EstimatorConfig =
            toml::from_str(&toml_str).expect("deserialization should work");
        assert_eq!(roundtripped.calibration.water_top, Some(2050.0));
        assert_eq!(
            original.matrix.clay_modulus_gpa,
            roundtripped.matrix.clay_modulus_gpa
        );
    }

    #[test]
    fn test_all_sections_serialize() {
        let toml_str = EstimatorConfig::default().to_toml().expect("serialization should work");
        for section in ["[well]", "[fluids]", "[matrix]", "[solver]", "[input]"] {
            assert!(toml_str.contains(section), "Missing {section} section");
        }
    }

    #[test]
    fn test_inversion_method_from_str() {
        assert_eq!("Bisection".parse::<InversionMethod>(), Ok(InversionMethod::Bisection));
        assert!("newton".parse::<InversionMethod>().is_err());
    }
}
