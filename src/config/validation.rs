//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for EstimatorConfig.
///
/// Maintained by hand to match the struct hierarchy in estimator_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [well]
        "well",
        "well.name",
        "well.field",
        // [fluids]
        "fluids",
        "fluids.brine_modulus_gpa",
        "fluids.hydrocarbon_modulus_gpa",
        "fluids.brine_density_gcc",
        "fluids.hydrocarbon_density_gcc",
        // [matrix]
        "matrix",
        "matrix.quartz_modulus_gpa",
        "matrix.clay_modulus_gpa",
        "matrix.quartz_density_gcc",
        "matrix.clay_density_gcc",
        // [calibration]
        "calibration",
        "calibration.water_top",
        "calibration.water_base",
        // [solver]
        "solver",
        "solver.method",
        "solver.max_iterations",
        "solver.tolerance",
        // [input]
        "input",
        "input.malformed_rows",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexically smallest key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Does not fail on unknown keys; parse errors are left to serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let Ok(value) = raw_toml.parse::<toml::Value>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

fn require_positive(name: &str, value: f64, errors: &mut Vec<String>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(format!("{name} = {value} must be a finite positive number"));
    }
}

fn warn_outside(
    field: &str,
    value: f64,
    (lo, hi): (f64, f64),
    unit: &str,
    warnings: &mut Vec<ValidationWarning>,
) {
    if value.is_finite() && (value < lo || value > hi) {
        warnings.push(ValidationWarning {
            field: field.to_string(),
            message: format!("{field} = {value:.3} is outside typical range ({lo}-{hi} {unit})"),
            suggestion: None,
        });
    }
}

/// Validate physical ranges on a parsed EstimatorConfig.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent a run; warnings are suspicious but not fatal.
pub fn validate_physical_ranges(
    config: &super::EstimatorConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let f = &config.fluids;
    let m = &config.matrix;
    let s = &config.solver;

    require_positive("fluids.brine_modulus_gpa", f.brine_modulus_gpa, &mut errors);
    require_positive("fluids.hydrocarbon_modulus_gpa", f.hydrocarbon_modulus_gpa, &mut errors);
    require_positive("fluids.brine_density_gcc", f.brine_density_gcc, &mut errors);
    require_positive("fluids.hydrocarbon_density_gcc", f.hydrocarbon_density_gcc, &mut errors);
    require_positive("matrix.quartz_modulus_gpa", m.quartz_modulus_gpa, &mut errors);
    require_positive("matrix.clay_modulus_gpa", m.clay_modulus_gpa, &mut errors);
    require_positive("matrix.quartz_density_gcc", m.quartz_density_gcc, &mut errors);
    require_positive("matrix.clay_density_gcc", m.clay_density_gcc, &mut errors);
    require_positive("solver.tolerance", s.tolerance, &mut errors);

    if s.max_iterations == 0 {
        errors.push("solver.max_iterations must be > 0".to_string());
    }

    // Brine: 2.0-3.5 GPa across normal reservoir P-T-salinity
    warn_outside("fluids.brine_modulus_gpa", f.brine_modulus_gpa, (2.0, 3.5), "GPa", &mut warnings);
    // Hydrocarbons: dry gas ~0.01 up to heavy oil ~2.0
    warn_outside(
        "fluids.hydrocarbon_modulus_gpa",
        f.hydrocarbon_modulus_gpa,
        (0.01, 2.0),
        "GPa",
        &mut warnings,
    );
    warn_outside(
        "fluids.brine_density_gcc",
        f.brine_density_gcc,
        (0.95, 1.25),
        "g/cc",
        &mut warnings,
    );
    warn_outside(
        "fluids.hydrocarbon_density_gcc",
        f.hydrocarbon_density_gcc,
        (0.05, 1.0),
        "g/cc",
        &mut warnings,
    );
    // Minerals: clays ~15-25 GPa, quartz 36-38, calcite ~70
    warn_outside(
        "matrix.quartz_modulus_gpa",
        m.quartz_modulus_gpa,
        (30.0, 80.0),
        "GPa",
        &mut warnings,
    );
    warn_outside("matrix.clay_modulus_gpa", m.clay_modulus_gpa, (5.0, 40.0), "GPa", &mut warnings);
    warn_outside(
        "matrix.quartz_density_gcc",
        m.quartz_density_gcc,
        (2.5, 3.0),
        "g/cc",
        &mut warnings,
    );
    warn_outside("matrix.clay_density_gcc", m.clay_density_gcc, (2.0, 3.0), "g/cc", &mut warnings);

    if s.tolerance.is_finite() && s.tolerance > 1e-3 {
        warnings.push(ValidationWarning {
            field: "solver.tolerance".to_string(),
            message: format!(
                "solver.tolerance = {:e} is coarse; saturations may be off by that much",
                s.tolerance
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EstimatorConfig;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("hello", "hello"), 0);
        assert_eq!(levenshtein("modulas", "modulus"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [fluids]
            brine_modulus_gpa = 2.6
        "#
        .parse()
        .expect("valid TOML");
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"fluids".to_string()));
        assert!(keys.contains(&"fluids.brine_modulus_gpa".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[fluids]
brine_modulas_gpa = 2.7
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].field.contains("brine_modulas_gpa"));
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("fluids.brine_modulus_gpa")
        );
    }

    #[test]
    fn test_valid_keys_produce_zero_warnings() {
        let toml_str = r#"
[well]
name = "T-1"

[matrix]
clay_modulus_gpa = 25.0

[solver]
method = "bisection"
"#;
        assert!(validate_unknown_keys(toml_str).is_empty());
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_defaults_are_clean() {
        let (errors, warnings) = validate_physical_ranges(&EstimatorConfig::default());
        assert!(errors.is_empty(), "Defaults should produce no errors: {errors:?}");
        assert!(warnings.is_empty(), "Defaults should produce no warnings: {warnings:?}");
    }

    #[test]
    fn test_non_positive_modulus_is_error() {
        let mut config = EstimatorConfig::default();
        config.fluids.hydrocarbon_modulus_gpa = 0.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("hydrocarbon_modulus_gpa")));
    }

    #[test]
    fn test_nan_density_is_error() {
        let mut config = EstimatorConfig::default();
        config.matrix.quartz_density_gcc = f64::NAN;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("quartz_density_gcc")));
    }

    #[test]
    fn test_gas_modulus_is_not_suspicious() {
        let mut config = EstimatorConfig::default();
        config.fluids.hydrocarbon_modulus_gpa = 0.05;
        let (_, warnings) = validate_physical_ranges(&config);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_calcite_matrix_out_of_quartz_range_warns() {
        let mut config = EstimatorConfig::default();
        config.matrix.quartz_modulus_gpa = 95.0;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "matrix.quartz_modulus_gpa"));
    }

    #[test]
    fn test_zero_iterations_is_error() {
        let mut config = EstimatorConfig::default();
        config.solver.max_iterations = 0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("max_iterations")));
    }
}
