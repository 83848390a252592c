//! CSV well-log parsing
//!
//! Header row of curve mnemonics, one sample per line. Lines starting with
//! `#` are comments; a `# well: NAME` comment sets the well name.

use super::{
    parse_value, row_depth, sample_from_row, ColumnMap, LogReadError, RowCollector,
    DEFAULT_NULL_VALUE,
};
use crate::config::MalformedRowPolicy;
use crate::types::WellLog;

/// Split a CSV line respecting quoted fields (handles commas inside quotes).
/// Returns owned strings because quoted fields need unquoting.
pub fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    // Escaped quote ("")
                    if chars.peek() == Some(&'"') {
                        current.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Parse CSV text into a `WellLog`.
pub fn parse_csv_log(
    contents: &str,
    fallback_name: &str,
    policy: MalformedRowPolicy,
) -> Result<WellLog, LogReadError> {
    let mut well = fallback_name.to_string();
    let mut map: Option<ColumnMap> = None;
    let mut collector = RowCollector::new(policy);

    for (idx, raw_line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if let Some(name) = comment.trim().strip_prefix("well:") {
                well = name.trim().to_string();
            }
            continue;
        }

        let fields = csv_split(line);
        if map.is_none() {
            map = Some(ColumnMap::from_mnemonics(fields.as_slice())?);
            continue;
        }
        let Some(columns) = map.as_ref() else {
            continue;
        };

        let values: Vec<Option<f64>> = fields
            .iter()
            .map(|f| parse_value(f, DEFAULT_NULL_VALUE))
            .collect();
        let depth = row_depth(columns, &values);
        collector.push(line_no, depth, sample_from_row(columns, &values))?;
    }

    if map.is_none() {
        return Err(LogReadError::Format("CSV has no header row".to_string()));
    }
    collector.finish(well)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# well: F-9A
DEPTH,DTC,DTS,PHI,VSH,RHOB
2000.0,90.0,170.0,0.25,0.05,2.32
2000.5,91.0,171.0,0.24,0.05,-999.25
2001.0,,170.0,0.25,0.05,2.32
2001.5,92.0,170.0,1.40,0.05,2.30
";

    #[test]
    fn test_csv_split_quoted() {
        let fields = csv_split(r#""Depth, m",DTC,"say ""hi""""#);
        assert_eq!(fields, vec!["Depth, m", "DTC", r#"say "hi""#]);
    }

    #[test]
    fn test_parse_skips_malformed_rows() {
        let log = parse_csv_log(SAMPLE, "fallback", MalformedRowPolicy::Skip).expect("parses");
        assert_eq!(log.well, "F-9A");
        assert_eq!(log.len(), 2);
        assert_eq!(log.skipped_rows, 2);
        assert_eq!(log.skipped_depths, vec![2001.0, 2001.5]);
        assert_eq!(log.samples[0].rhob, Some(2.32));
        // Null RHOB is optional, not malformed
        assert_eq!(log.samples[1].rhob, None);
    }

    #[test]
    fn test_parse_fail_policy_reports_line() {
        let err = parse_csv_log(SAMPLE, "fallback", MalformedRowPolicy::Fail).unwrap_err();
        match err {
            LogReadError::Malformed { line, reason } => {
                assert_eq!(line, 5);
                assert!(reason.contains("DTC"));
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_header_curve() {
        let err =
            parse_csv_log("DEPTH,DTC,PHI\n1,90,0.2\n", "x", MalformedRowPolicy::Skip).unwrap_err();
        assert!(matches!(err, LogReadError::MissingCurve("DTS", _)));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = parse_csv_log("DEPTH,DTC,DTS,PHI\n", "x", MalformedRowPolicy::Skip).unwrap_err();
        assert!(matches!(err, LogReadError::Empty));
    }

    #[test]
    fn test_fallback_well_name() {
        let text = "DEPT,DT,DTSM,PHIE\n1,90,170,0.2\n";
        let log = parse_csv_log(text, "stem", MalformedRowPolicy::Skip).expect("parses");
        assert_eq!(log.well, "stem");
    }
}
