// src/table/mod.rs
//! Table loading and cleaning for the published results CSVs
//!
//! Turns one delimited results file into typed benchmark records: workload
//! and scenario labels normalized, dates parsed, the version ordinal
//! extracted. Numeric cleanup of the result field happens later, at
//! classification time, because the parse policy is per pipeline.

use crate::pipeline::{AliasRule, PipelineSpec};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::path::Path;

/// One raw row of a results table after label normalization.
#[derive(Debug, Clone)]
pub struct BenchmarkRecord {
    pub public_id: String,
    /// Lowercased, alias-normalized workload name ("Model MLC").
    pub workload: String,
    pub scenario: Option<String>,
    pub version: Option<String>,
    /// First run of decimal digits in the version label, if any.
    pub version_ordinal: Option<u32>,
    pub date: Option<NaiveDate>,
    pub units: String,
    /// Raw result text; cleaned and parsed at classification time.
    pub result_text: String,
    pub organization: Option<String>,
    pub accelerator: Option<String>,
    pub total_accelerators: Option<String>,
}

/// How a workload filter pattern is matched against the normalized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadMatch {
    Exact,
    Substring,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("cannot parse `{value}` as a number")]
    Numeric { value: String },

    #[error("cannot parse `{value}` as a date")]
    Date { value: String },
}

/// Strip thousands separators and quote characters, then parse as float.
pub fn clean_numeric(text: &str) -> Result<f64, TableError> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '"')
        .collect();
    cleaned.parse::<f64>().map_err(|_| TableError::Numeric {
        value: text.to_string(),
    })
}

/// Tolerant variant of [`clean_numeric`]: malformed text becomes `None`.
pub fn coerce_numeric(text: &str) -> Option<f64> {
    clean_numeric(text).ok()
}

/// True for a plain `digits[.digits]` result, the form the tiny energy
/// pipeline insists on before admitting a row.
pub fn is_plain_numeric(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    let mut saw_digit = false;
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            saw_digit = true;
            chars.next();
        } else {
            break;
        }
    }
    if !saw_digit {
        return false;
    }
    match chars.next() {
        None => true,
        Some('.') => {
            let rest: Vec<char> = chars.collect();
            !rest.is_empty() && rest.iter().all(|c| c.is_ascii_digit())
        }
        Some(_) => false,
    }
}

/// Parse a date cell in any of the formats the results tables use.
pub fn parse_date(text: &str) -> Result<NaiveDate, TableError> {
    let trimmed = text.trim();
    for format in ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(TableError::Date {
        value: text.to_string(),
    })
}

/// Extract the version ordinal as the first run of decimal digits in the
/// label ("v3.1-0101" -> 3). A digitless label has no ordinal.
pub fn version_ordinal(label: &str) -> Option<u32> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok()
}

/// Lowercase the workload name, then apply the alias table (exact match).
pub fn normalize_workload(raw: &str, aliases: &[AliasRule]) -> String {
    let lowered = raw.trim().to_lowercase();
    for alias in aliases {
        if lowered == alias.from {
            return alias.to.clone();
        }
    }
    lowered
}

/// Lowercase the scenario label, optionally removing interior whitespace.
pub fn normalize_scenario(raw: &str, strip_whitespace: bool) -> String {
    let lowered = raw.trim().to_lowercase();
    if strip_whitespace {
        lowered.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        lowered
    }
}

struct ColumnMap {
    public_id: usize,
    workload: usize,
    units: usize,
    value: usize,
    scenario: Option<usize>,
    version: Option<usize>,
    date: Option<usize>,
    organization: Option<usize>,
    accelerator: Option<usize>,
    total_accelerators: Option<usize>,
}

impl ColumnMap {
    fn build(headers: &csv::StringRecord, spec: &PipelineSpec) -> Result<Self, TableError> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| TableError::MissingColumn(name.to_string()))
        };

        let need_scenario = spec.key.scenario || spec.scenario_filter.is_some();
        let scenario = if need_scenario {
            Some(required("Scenario")?)
        } else {
            position("Scenario")
        };
        let version = if spec.key.version {
            Some(required("version")?)
        } else {
            position("version")
        };
        let date = if spec.key.date {
            Some(required("date")?)
        } else {
            position("date")
        };
        let (organization, accelerator, total_accelerators) = if spec.require_system_columns {
            (
                Some(required("Organization")?),
                Some(required("accelerator_model_name")?),
                Some(required("Total Accelerators")?),
            )
        } else {
            (
                position("Organization"),
                position("accelerator_model_name"),
                position("Total Accelerators"),
            )
        };

        Ok(Self {
            public_id: required("Public ID")?,
            workload: required("Model MLC")?,
            units: required("Units")?,
            value: required(&spec.value_column)?,
            scenario,
            version,
            date,
            organization,
            accelerator,
            total_accelerators,
        })
    }
}

/// Load one results table, normalize labels, apply the scenario filter.
///
/// Column presence follows the spec: the identifying columns are always
/// required, the key columns only when the pipeline's join key uses them.
pub fn load_records(path: &Path, spec: &PipelineSpec) -> Result<Vec<BenchmarkRecord>, TableError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::build(&headers, spec)?;

    let cell = |row: &csv::StringRecord, idx: usize| row.get(idx).unwrap_or("").to_string();
    let optional_cell = |row: &csv::StringRecord, idx: Option<usize>| {
        idx.map(|i| cell(row, i)).filter(|s| !s.trim().is_empty())
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;

        let scenario = columns
            .scenario
            .map(|i| normalize_scenario(row.get(i).unwrap_or(""), spec.strip_scenario_whitespace));
        if let Some(wanted) = &spec.scenario_filter {
            match &scenario {
                Some(s) if s == wanted => {}
                _ => continue,
            }
        }

        let version = optional_cell(&row, columns.version);
        let version_ordinal = version.as_deref().and_then(version_ordinal);

        // Dates are parsed strictly in every pipeline; only the result
        // field has a per-pipeline tolerance.
        let date = match columns.date {
            Some(i) if spec.key.date => Some(parse_date(row.get(i).unwrap_or(""))?),
            Some(i) => row.get(i).and_then(|s| parse_date(s).ok()),
            None => None,
        };

        records.push(BenchmarkRecord {
            public_id: cell(&row, columns.public_id),
            workload: normalize_workload(row.get(columns.workload).unwrap_or(""), &spec.aliases),
            scenario,
            version,
            version_ordinal,
            date,
            units: cell(&row, columns.units),
            result_text: cell(&row, columns.value),
            organization: optional_cell(&row, columns.organization),
            accelerator: optional_cell(&row, columns.accelerator),
            total_accelerators: optional_cell(&row, columns.total_accelerators),
        });
    }

    log::debug!(
        "loaded {} records from {} for pipeline {}",
        records.len(),
        path.display(),
        spec.name
    );
    Ok(records)
}

/// Keep records whose workload matches one of the (lowercase) patterns.
pub fn retain_workloads(
    records: Vec<BenchmarkRecord>,
    patterns: &[&str],
    mode: WorkloadMatch,
) -> Vec<BenchmarkRecord> {
    records
        .into_iter()
        .filter(|r| {
            patterns.iter().any(|p| match mode {
                WorkloadMatch::Exact => r.workload == *p,
                WorkloadMatch::Substring => r.workload.contains(p),
            })
        })
        .collect()
}

/// The wide-format performance-trend table: one row per benchmark, one
/// column per publication date, values already normalized to the first
/// version. Blank cells mean the benchmark was absent from that round.
#[derive(Debug, Clone)]
pub struct WideTable {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<(String, Vec<Option<f64>>)>,
}

impl WideTable {
    /// Return the (date, value) series for one benchmark, skipping blanks.
    pub fn series(&self, name: &str) -> Option<Vec<(NaiveDate, f64)>> {
        self.rows.iter().find(|(n, _)| n == name).map(|(_, vals)| {
            self.dates
                .iter()
                .zip(vals.iter())
                .filter_map(|(d, v)| v.map(|v| (*d, v)))
                .collect()
        })
    }
}

/// Load the wide-format table: first header cell is the index name, the
/// remaining header cells are dates.
pub fn load_wide_table(path: &Path) -> Result<WideTable, TableError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut dates = Vec::new();
    for cell in headers.iter().skip(1) {
        dates.push(parse_date(cell)?);
    }

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row?;
        let name = row.get(0).unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }
        let mut values = Vec::with_capacity(dates.len());
        for idx in 1..=dates.len() {
            let text = row.get(idx).unwrap_or("").trim();
            if text.is_empty() {
                values.push(None);
            } else {
                values.push(Some(clean_numeric(text)?));
            }
        }
        rows.push((name, values));
    }

    Ok(WideTable { dates, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_numeric_strips_separators_and_quotes() {
        assert_eq!(clean_numeric("\"1,234.5\"").unwrap(), 1234.5);
        assert_eq!(clean_numeric("42").unwrap(), 42.0);
        assert!(clean_numeric("https://example.com").is_err());
    }

    #[test]
    fn test_coerce_numeric_drops_garbage() {
        assert_eq!(coerce_numeric("1,000"), Some(1000.0));
        assert_eq!(coerce_numeric("n/a"), None);
    }

    #[test]
    fn test_version_ordinal_extraction() {
        assert_eq!(version_ordinal("v3.1-0101"), Some(3));
        assert_eq!(version_ordinal("v4.0"), Some(4));
        assert_eq!(version_ordinal("preview"), None);
    }

    #[test]
    fn test_plain_numeric_guard() {
        assert!(is_plain_numeric("123"));
        assert!(is_plain_numeric("123.45"));
        assert!(!is_plain_numeric("123."));
        assert!(!is_plain_numeric(".5"));
        assert!(!is_plain_numeric("1,234"));
        assert!(!is_plain_numeric("https://x"));
    }

    #[test]
    fn test_workload_alias_applies_after_lowercase() {
        let aliases = vec![AliasRule::new("rnnt", "rnn-t")];
        assert_eq!(normalize_workload("RNNT", &aliases), "rnn-t");
        assert_eq!(normalize_workload("ResNet", &aliases), "resnet");
    }

    #[test]
    fn test_scenario_whitespace_strip() {
        assert_eq!(normalize_scenario("Single Stream", true), "singlestream");
        assert_eq!(normalize_scenario("Offline", false), "offline");
    }

    #[test]
    fn test_date_formats() {
        let iso = parse_date("2023-06-28").unwrap();
        let us = parse_date("06/28/2023").unwrap();
        assert_eq!(iso, us);
        assert!(parse_date("June 28th").is_err());
    }
}
