//! Log acquisition - reading well-log suites from disk
//!
//! Two formats, chosen by file extension:
//! - `.las`: LAS 2.0 (unwrapped)
//! - anything else: CSV with a header row
//!
//! Both map curve mnemonics onto `LogSample` fields through the same alias
//! table and apply the same malformed-row policy.

mod csv_log;
mod las;

pub use csv_log::{csv_split, parse_csv_log};
pub use las::parse_las_log;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::MalformedRowPolicy;
use crate::types::{LogSample, WellLog};

/// Conventional LAS null value, also honoured in CSV files.
pub const DEFAULT_NULL_VALUE: f64 = -999.25;

/// Errors while reading a log file
#[derive(Error, Debug)]
pub enum LogReadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required curve {0} (accepted mnemonics: {1})")]
    MissingCurve(&'static str, String),

    #[error("Malformed row at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Unsupported log format: {0}")]
    Format(String),

    #[error("Log contains no data rows")]
    Empty,
}

// ============================================================================
// Curve Aliases
// ============================================================================

/// Log curves the estimator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Depth,
    Dtc,
    Dts,
    Phi,
    Vsh,
    Rhob,
    SwTrue,
}

impl Curve {
    pub const ALL: [Curve; 7] = [
        Curve::Depth,
        Curve::Dtc,
        Curve::Dts,
        Curve::Phi,
        Curve::Vsh,
        Curve::Rhob,
        Curve::SwTrue,
    ];

    /// Accepted mnemonics, case-insensitive.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Curve::Depth => &["DEPTH", "DEPT", "MD"],
            Curve::Dtc => &["DTC", "DT", "DTCO"],
            Curve::Dts => &["DTS", "DTSM", "DT_SHEAR"],
            Curve::Phi => &["PHI", "PHIE", "PHIT", "NPHI"],
            Curve::Vsh => &["VSH", "VCL", "VSHALE"],
            Curve::Rhob => &["RHOB", "DEN", "RHOZ"],
            Curve::SwTrue => &["SW", "SW_TRUE", "SWT"],
        }
    }

    pub fn name(self) -> &'static str {
        self.aliases()[0]
    }

    fn is_required(self) -> bool {
        matches!(self, Curve::Depth | Curve::Dtc | Curve::Dts | Curve::Phi)
    }

    /// Match a mnemonic against every curve's aliases.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Curve> {
        let m = mnemonic.trim().to_ascii_uppercase();
        Curve::ALL
            .into_iter()
            .find(|c| c.aliases().iter().any(|a| *a == m))
    }
}

/// Column index of each curve; first matching mnemonic wins.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    indices: [Option<usize>; 7],
}

impl ColumnMap {
    pub fn from_mnemonics<S: AsRef<str>>(mnemonics: &[S]) -> Result<Self, LogReadError> {
        let mut map = Self::default();
        for (idx, mnemonic) in mnemonics.iter().enumerate() {
            if let Some(curve) = Curve::from_mnemonic(mnemonic.as_ref()) {
                let slot = &mut map.indices[curve as usize];
                if slot.is_none() {
                    *slot = Some(idx);
                }
            }
        }
        for curve in Curve::ALL.into_iter().filter(|c| c.is_required()) {
            if map.get(curve).is_none() {
                return Err(LogReadError::MissingCurve(curve.name(), curve.aliases().join("|")));
            }
        }
        Ok(map)
    }

    pub fn get(&self, curve: Curve) -> Option<usize> {
        self.indices[curve as usize]
    }
}

// ============================================================================
// Row Assembly
// ============================================================================

/// Parse a numeric cell; blank, unparseable, non-finite or null cells are `None`.
pub(crate) fn parse_value(raw: &str, null_value: f64) -> Option<f64> {
    let v: f64 = raw.trim().parse().ok()?;
    if !v.is_finite() || (v - null_value).abs() < 1e-9 {
        return None;
    }
    Some(v)
}

fn cell(map: &ColumnMap, values: &[Option<f64>], curve: Curve) -> Option<f64> {
    map.get(curve).and_then(|i| values.get(i).copied().flatten())
}

/// Depth of a row, if its depth cell parsed.
pub(crate) fn row_depth(map: &ColumnMap, values: &[Option<f64>]) -> Option<f64> {
    cell(map, values, Curve::Depth)
}

/// Build a validated sample from parsed cells.
pub(crate) fn sample_from_row(
    map: &ColumnMap,
    values: &[Option<f64>],
) -> Result<LogSample, String> {
    let cell = |curve: Curve| cell(map, values, curve);
    let required =
        |curve: Curve| cell(curve).ok_or_else(|| format!("{} is null or missing", curve.name()));

    let sample = LogSample {
        depth: required(Curve::Depth)?,
        dtc: required(Curve::Dtc)?,
        dts: required(Curve::Dts)?,
        phi: required(Curve::Phi)?,
        vsh: cell(Curve::Vsh).unwrap_or(0.0),
        rhob: cell(Curve::Rhob),
        sw_true: cell(Curve::SwTrue),
    };
    sample.check()?;
    Ok(sample)
}

/// Collects samples while applying the malformed-row policy.
///
/// Skipped rows keep their depth (when it parsed) so a calibration interval
/// that overlaps one can be rejected later.
pub(crate) struct RowCollector {
    policy: MalformedRowPolicy,
    samples: Vec<LogSample>,
    skipped: usize,
    skipped_depths: Vec<f64>,
}

impl RowCollector {
    pub(crate) fn new(policy: MalformedRowPolicy) -> Self {
        Self {
            policy,
            samples: Vec::new(),
            skipped: 0,
            skipped_depths: Vec::new(),
        }
    }

    pub(crate) fn push(
        &mut self,
        line: usize,
        depth: Option<f64>,
        row: Result<LogSample, String>,
    ) -> Result<(), LogReadError> {
        match row {
            Ok(sample) => self.samples.push(sample),
            Err(reason) => match self.policy {
                MalformedRowPolicy::Skip => {
                    warn!(line, depth = ?depth, reason = %reason, "Skipping malformed log row");
                    self.skipped += 1;
                    self.skipped_depths.extend(depth);
                }
                MalformedRowPolicy::Fail => return Err(LogReadError::Malformed { line, reason }),
            },
        }
        Ok(())
    }

    pub(crate) fn finish(self, well: String) -> Result<WellLog, LogReadError> {
        if self.samples.is_empty() {
            return Err(LogReadError::Empty);
        }
        Ok(WellLog {
            well,
            samples: self.samples,
            skipped_rows: self.skipped,
            skipped_depths: self.skipped_depths,
        })
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Csv,
    Las,
}

impl LogFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("las") => LogFormat::Las,
            _ => LogFormat::Csv,
        }
    }
}

/// Read a log file, picking the parser from the file extension.
///
/// The well name defaults to the file stem when the file does not carry one.
pub fn read_log(path: &Path, policy: MalformedRowPolicy) -> Result<WellLog, LogReadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LogReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fallback_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let format = LogFormat::from_path(path);
    let log = match format {
        LogFormat::Las => parse_las_log(&contents, &fallback_name, policy)?,
        LogFormat::Csv => parse_csv_log(&contents, &fallback_name, policy)?,
    };

    let (top, base) = log.depth_range().unwrap_or_default();
    info!(
        path = %path.display(),
        format = ?format,
        well = %log.well,
        samples = log.len(),
        top,
        base,
        skipped = log.skipped_rows,
        "Loaded well log"
    );
    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_aliases_case_insensitive() {
        assert_eq!(Curve::from_mnemonic("dt"), Some(Curve::Dtc));
        assert_eq!(Curve::from_mnemonic(" DTSM "), Some(Curve::Dts));
        assert_eq!(Curve::from_mnemonic("nphi"), Some(Curve::Phi));
        assert_eq!(Curve::from_mnemonic("GR"), None);
    }

    #[test]
    fn test_column_map_requires_core_curves() {
        let err = ColumnMap::from_mnemonics(&["DEPT", "DT", "PHIE"]).unwrap_err();
        assert!(matches!(err, LogReadError::MissingCurve("DTS", _)));
        let map =
            ColumnMap::from_mnemonics(&["DEPT", "GR", "DT", "DTSM", "PHIE"]).expect("complete");
        assert_eq!(map.get(Curve::Dtc), Some(2));
        assert_eq!(map.get(Curve::Vsh), None);
    }

    #[test]
    fn test_parse_value_nulls() {
        assert_eq!(parse_value(" 90.5 ", DEFAULT_NULL_VALUE), Some(90.5));
        assert_eq!(parse_value("-999.25", DEFAULT_NULL_VALUE), None);
        assert_eq!(parse_value("", DEFAULT_NULL_VALUE), None);
        assert_eq!(parse_value("NaN", DEFAULT_NULL_VALUE), None);
    }

    #[test]
    fn test_sample_from_row_optional_curves() {
        let map =
            ColumnMap::from_mnemonics(&["DEPTH", "DTC", "DTS", "PHI", "RHOB"]).expect("complete");
        let sample = sample_from_row(&map, &[Some(1.0), Some(90.0), Some(170.0), Some(0.25), None])
            .expect("valid row");
        assert_eq!(sample.vsh, 0.0);
        assert_eq!(sample.rhob, None);
        let bad = [Some(1.0), None, Some(170.0), Some(0.25), None];
        let err = sample_from_row(&map, &bad).unwrap_err();
        assert!(err.contains("DTC"));
        assert_eq!(row_depth(&map, &bad), Some(1.0));
    }

    #[test]
    fn test_collector_records_skipped_depths() {
        let mut rows = RowCollector::new(MalformedRowPolicy::Skip);
        let good = LogSample::new(2000.0, 90.0, 170.0, 0.25, 0.0);
        rows.push(2, Some(2000.0), Ok(good)).expect("skip policy");
        rows.push(3, Some(2001.0), Err("DTC is null or missing".into())).expect("skip policy");
        rows.push(4, None, Err("DEPTH is null or missing".into())).expect("skip policy");
        let log = rows.finish("W".to_string()).expect("one sample");
        assert_eq!(log.skipped_rows, 2);
        assert_eq!(log.skipped_depths, vec![2001.0]);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(LogFormat::from_path(Path::new("well.LAS")), LogFormat::Las);
        assert_eq!(LogFormat::from_path(Path::new("well.csv")), LogFormat::Csv);
        assert_eq!(LogFormat::from_path(Path::new("well")), LogFormat::Csv);
    }
}
