//! LAS 2.0 well-log parsing
//!
//! Reads the `~W` (WELL, NULL), `~C` (curve order) and `~A` (data) sections.
//! Wrapped files (`WRAP. YES`) are rejected.

use super::{
    parse_value, row_depth, sample_from_row, ColumnMap, LogReadError, RowCollector,
    DEFAULT_NULL_VALUE,
};
use crate::config::MalformedRowPolicy;
use crate::types::WellLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Version,
    Well,
    Curve,
    Ascii,
    Other,
}

impl Section {
    fn from_header(line: &str) -> Self {
        match line.chars().nth(1).map(|c| c.to_ascii_uppercase()) {
            Some('V') => Section::Version,
            Some('W') => Section::Well,
            Some('C') => Section::Curve,
            Some('A') => Section::Ascii,
            _ => Section::Other,
        }
    }
}

/// A header line `MNEM.UNIT  DATA : DESCRIPTION`, split into mnemonic and data.
fn header_line(line: &str) -> Option<(String, String)> {
    let (mnemonic, rest) = line.split_once('.')?;
    // Unit runs up to the first whitespace; data up to the last colon
    let after_unit = rest.find(char::is_whitespace).map_or("", |i| &rest[i..]);
    let data = after_unit.rsplit_once(':').map_or(after_unit, |(d, _)| d);
    Some((mnemonic.trim().to_ascii_uppercase(), data.trim().to_string()))
}

/// Parse LAS 2.0 text into a `WellLog`.
pub fn parse_las_log(
    contents: &str,
    fallback_name: &str,
    policy: MalformedRowPolicy,
) -> Result<WellLog, LogReadError> {
    let mut section = Section::Other;
    let mut well = fallback_name.to_string();
    let mut null_value = DEFAULT_NULL_VALUE;
    let mut mnemonics: Vec<String> = Vec::new();
    let mut map: Option<ColumnMap> = None;
    let mut collector = RowCollector::new(policy);

    for (idx, raw_line) in contents.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('~') {
            section = Section::from_header(line);
            if section == Section::Ascii {
                map = Some(ColumnMap::from_mnemonics(mnemonics.as_slice())?);
            }
            continue;
        }

        match section {
            Section::Version => {
                if let Some((mnem, data)) = header_line(line) {
                    if mnem == "WRAP" && data.eq_ignore_ascii_case("YES") {
                        return Err(LogReadError::Format(
                            "wrapped LAS files are not supported".to_string(),
                        ));
                    }
                }
            }
            Section::Well => {
                if let Some((mnem, data)) = header_line(line) {
                    match mnem.as_str() {
                        "WELL" if !data.is_empty() => well = data,
                        "NULL" => {
                            null_value = data.parse().map_err(|_| {
                                LogReadError::Format(format!(
                                    "invalid NULL value '{data}' at line {line_no}"
                                ))
                            })?;
                        }
                        _ => {}
                    }
                }
            }
            Section::Curve => {
                if let Some((mnem, _)) = header_line(line) {
                    mnemonics.push(mnem);
                }
            }
            Section::Ascii => {
                let Some(columns) = map.as_ref() else {
                    continue;
                };
                let values: Vec<Option<f64>> = line
                    .split_whitespace()
                    .map(|f| parse_value(f, null_value))
                    .collect();
                let row = if values.len() == mnemonics.len() {
                    sample_from_row(columns, &values)
                } else {
                    Err(format!("expected {} values, found {}", mnemonics.len(), values.len()))
                };
                collector.push(line_no, row_depth(columns, &values), row)?;
            }
            Section::Other => {}
        }
    }

    if map.is_none() {
        return Err(LogReadError::Format("LAS file has no ~A section".to_string()));
    }
    collector.finish(well)
}
