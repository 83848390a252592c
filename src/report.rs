//! Report rendering for estimation runs
//!
//! - `table`: fixed-width text for terminals
//! - `csv`: one row per depth, for spreadsheets and plotting tools
//! - `json`: the full run with calibration diagnostics and a timestamp;
//!   several runs render as one JSON array

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::EstimationRun;

/// Output format for a rendered run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown report format '{other}' (expected table, csv or json)"
            )),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    generator: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean_sw: Option<f64>,
    #[serde(flatten)]
    run: &'a EstimationRun,
}

/// Render a run in the requested format.
pub fn render(run: &EstimationRun, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Table => Ok(render_table(run)),
        ReportFormat::Csv => Ok(render_csv(run)),
        ReportFormat::Json => render_json(run),
    }
}

/// Render several runs as one document.
///
/// A single run renders exactly as [`render`] does. More than one JSON run
/// becomes an array of reports; text formats are separated by a blank line.
pub fn render_all(
    runs: &[EstimationRun],
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match (format, runs) {
        (_, [run]) => render(run, format),
        (ReportFormat::Json, _) => {
            let generated_at = Utc::now();
            let reports: Vec<JsonReport> =
                runs.iter().map(|run| JsonReport::new(run, generated_at)).collect();
            serde_json::to_string_pretty(&reports)
        }
        _ => Ok(runs
            .iter()
            .map(|run| render(run, format))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n")),
    }
}

impl<'a> JsonReport<'a> {
    fn new(run: &'a EstimationRun, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            generator: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            mean_sw: run.mean_sw(),
            run,
        }
    }
}

pub fn render_json(run: &EstimationRun) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport::new(run, Utc::now()))
}

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map(|x| format!("{x:.precision$}")).unwrap_or_default()
}

pub fn render_csv(run: &EstimationRun) -> String {
    let mut out = String::from("DEPTH,SW_EST,SHC,SW_TRUE,KSAT_GPA,KF_GPA,CLAMPED\n");
    for e in &run.estimates {
        let _ = writeln!(
            out,
            "{},{:.6},{:.6},{},{:.6},{},{}",
            e.depth,
            e.sw_est,
            e.shc(),
            opt(e.sw_true, 6),
            e.ksat_gpa,
            opt(e.kf_gpa, 6),
            e.clamped
        );
    }
    out
}

pub fn render_table(run: &EstimationRun) -> String {
    let cal = &run.calibration;
    let mut out = String::new();

    let _ = writeln!(out, "Well: {}", run.well);
    let _ = writeln!(
        out,
        "Calibration: water zone {:.1} - {:.1} | {} samples | Kdry {:.3} GPa | \
         RMS DTC misfit {:.3} us/ft | {} iterations",
        run.water_zone.0,
        run.water_zone.1,
        cal.sample_count,
        cal.kdry_gpa(),
        cal.rms_dtc_misfit,
        cal.iterations
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {:>10} {:>8} {:>8} {:>8} {:>10} {:>8}  {}",
        "DEPTH", "SW_EST", "SHC", "SW_TRUE", "KSAT", "KF", "FLAG"
    );
    for e in &run.estimates {
        let _ = writeln!(
            out,
            "  {:>10.2} {:>8.3} {:>8.3} {:>8} {:>10.3} {:>8}  {}",
            e.depth,
            e.sw_est,
            e.shc(),
            opt(e.sw_true, 3),
            e.ksat_gpa,
            opt(e.kf_gpa, 3),
            if e.clamped { "clamped" } else { "" }
        );
    }
    let _ = writeln!(out);

    let _ = write!(out, "Estimated: {}", run.estimates.len());
    if run.skipped > 0 {
        let _ = write!(out, " | skipped: {}", run.skipped);
    }
    if let Some(mean) = run.mean_sw() {
        let _ = write!(out, " | mean Sw: {mean:.3}");
    }
    let _ = writeln!(out);
    if let Some(acc) = &run.accuracy {
        let _ = writeln!(
            out,
            "Accuracy vs truth ({} samples): bias {:+.4} | MAE {:.4} | RMSE {:.4} | std {:.4}",
            acc.count, acc.bias, acc.mae, acc.rmse, acc.error_std
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_engine::SaturationEstimator;
    use crate::types::{CalibrationZone, LogSample, WellLog};

    fn run() -> EstimationRun {
        let log = WellLog::new(
            "T-1",
            vec![
                LogSample::new(2000.0, 90.0, 170.0, 0.25, 0.0)
                    .with_rhob(2.32)
                    .with_sw_true(1.0),
                LogSample::new(2100.0, 92.0, 170.0, 0.25, 0.0).with_rhob(2.30),
                LogSample::new(2101.0, 110.0, 170.0, 0.25, 0.0).with_rhob(2.30),
            ],
        );
        let zone = CalibrationZone::from_interval(&log, 1990.0, 2010.0).expect("water sample");
        SaturationEstimator::default().run(&log, &zone).expect("run")
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("table".parse::<ReportFormat>(), Ok(ReportFormat::Table));
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_csv_has_row_per_estimate() {
        let csv = render_csv(&run());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("DEPTH,SW_EST,SHC"));
        // Clamped to Sw = 0: all hydrocarbon
        assert!(lines[3].starts_with("2101,0.000000,1.000000,"));
        assert!(lines[3].ends_with(",true"));
    }

    #[test]
    fn test_table_mentions_calibration() {
        let table = render_table(&run());
        assert!(table.contains("Well: T-1"));
        assert!(table.contains("Kdry"));
        assert!(table.contains("clamped"));
        assert!(table.contains("Accuracy vs truth (1 samples)"));
        assert!(table.contains("SHC"));
    }

    #[test]
    fn test_json_is_parseable() {
        let json = render_json(&run()).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value["well"], "T-1");
        assert_eq!(value["estimates"].as_array().map(Vec::len), Some(3));
        assert!(value["calibration"]["kdry_gpa"].as_f64().is_some());
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_render_all_json_is_one_array() {
        let runs = vec![run(), run()];
        let json = render_all(&runs, ReportFormat::Json).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        let reports = value.as_array().expect("array of reports");
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1]["well"], "T-1");
        assert_eq!(reports[0]["generated_at"], reports[1]["generated_at"]);
    }

    #[test]
    fn test_render_all_single_run_matches_render() {
        let runs = vec![run()];
        let json = render_all(&runs, ReportFormat::Json).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert!(value.is_object());
        assert_eq!(
            render_all(&runs, ReportFormat::Csv).expect("csv"),
            render_csv(&runs[0])
        );
    }

    #[test]
    fn test_render_all_text_joins_runs() {
        let runs = vec![run(), run()];
        let table = render_all(&runs, ReportFormat::Table).expect("table");
        assert_eq!(table.matches("Well: T-1").count(), 2);
    }
}
