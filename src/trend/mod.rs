// src/trend/mod.rs
//! Efficiency trend normalization
//!
//! Turns the raw efficiency measurements of one category (one workload, or
//! one hardware configuration) into a presentation-ready trend: best result
//! per (version, date) snapshot, ordered by version, never regressing, and
//! rescaled so the first version sits at exactly 1.0. Regressions in the raw
//! data are treated as measurement noise, not signal.

use crate::join::JoinedRecord;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// One point of a category's efficiency series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub version: String,
    pub ordinal: u32,
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum TrendError {
    #[error("cannot normalize an empty category group")]
    EmptyGroup,
}

/// Collect the trend points of one category from its joined records.
///
/// Records without a version ordinal or a date cannot take part in a
/// version-ordered trend and are skipped.
pub fn category_points(records: &[&JoinedRecord]) -> Vec<TrendPoint> {
    records
        .iter()
        .filter_map(|r| {
            Some(TrendPoint {
                version: r.version.clone()?,
                ordinal: r.version_ordinal?,
                date: r.date?,
                value: r.efficiency,
            })
        })
        .collect()
}

/// Normalize one category's efficiency series.
///
/// Steps, in order: collapse points sharing a (version, date) pair to the
/// maximum value observed for that snapshot; stable-sort by version ordinal
/// then date; ratchet so no point drops below the running maximum; divide
/// through by the first value; duplicate a singleton one day later so a
/// line is still drawable.
///
/// The output is non-decreasing and starts at exactly 1.0.
pub fn normalize_trend(points: &[TrendPoint]) -> Result<Vec<TrendPoint>, TrendError> {
    if points.is_empty() {
        return Err(TrendError::EmptyGroup);
    }

    // Best result per (version, date) snapshot.
    let mut best: HashMap<(String, NaiveDate), TrendPoint> = HashMap::new();
    for point in points {
        best.entry((point.version.clone(), point.date))
            .and_modify(|existing| {
                if point.value > existing.value {
                    existing.value = point.value;
                }
            })
            .or_insert_with(|| point.clone());
    }

    let mut trend: Vec<TrendPoint> = best.into_values().collect();
    trend.sort_by(|a, b| (a.ordinal, a.date).cmp(&(b.ordinal, b.date)));

    // Ratchet: a later version is never shown below an earlier one.
    let mut running_max = trend[0].value;
    for point in trend.iter_mut().skip(1) {
        if point.value < running_max {
            point.value = running_max;
        } else {
            running_max = point.value;
        }
    }

    let baseline = trend[0].value;
    for point in trend.iter_mut() {
        point.value /= baseline;
    }

    if trend.len() == 1 {
        let mut twin = trend[0].clone();
        twin.date += Duration::days(1);
        trend.push(twin);
    }

    Ok(trend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(version: &str, ordinal: u32, day: u32, value: f64) -> TrendPoint {
        TrendPoint {
            version: version.to_string(),
            ordinal,
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            value,
        }
    }

    #[test]
    fn test_ratchet_and_normalize_example() {
        let raw = vec![
            point("v1.0", 1, 1, 10.0),
            point("v2.0", 2, 2, 8.0),
            point("v3.0", 3, 3, 12.0),
            point("v4.0", 4, 4, 11.0),
        ];
        let trend = normalize_trend(&raw).unwrap();
        let values: Vec<f64> = trend.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 1.0, 1.2, 1.2]);
    }

    #[test]
    fn test_first_point_is_exactly_one() {
        let raw = vec![point("v1.0", 1, 1, 7.3), point("v2.0", 2, 2, 9.1)];
        let trend = normalize_trend(&raw).unwrap();
        assert_eq!(trend[0].value, 1.0);
    }

    #[test]
    fn test_output_is_non_decreasing() {
        let raw = vec![
            point("v1.0", 1, 1, 5.0),
            point("v2.0", 2, 2, 3.0),
            point("v2.1", 2, 9, 8.0),
            point("v3.0", 3, 3, 2.0),
            point("v4.0", 4, 4, 20.0),
        ];
        let trend = normalize_trend(&raw).unwrap();
        for pair in trend.windows(2) {
            assert!(pair[1].value >= pair[0].value);
        }
    }

    #[test]
    fn test_snapshot_grouping_takes_maximum() {
        let raw = vec![
            point("v1.0", 1, 1, 4.0),
            point("v1.0", 1, 1, 6.0),
            point("v2.0", 2, 2, 9.0),
        ];
        let trend = normalize_trend(&raw).unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].value, 1.0);
        assert_eq!(trend[1].value, 1.5);
    }

    #[test]
    fn test_equal_ordinals_ordered_by_date() {
        let raw = vec![
            point("v3.1", 3, 20, 8.0),
            point("v3.0", 3, 5, 4.0),
        ];
        let trend = normalize_trend(&raw).unwrap();
        assert_eq!(trend[0].version, "v3.0");
        assert_eq!(trend[1].version, "v3.1");
        assert_eq!(trend[1].value, 2.0);
    }

    #[test]
    fn test_singleton_duplicated_one_day_later() {
        let raw = vec![point("v1.0", 1, 1, 42.0)];
        let trend = normalize_trend(&raw).unwrap();
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].value, 1.0);
        assert_eq!(trend[1].value, 1.0);
        assert_eq!(trend[1].date, trend[0].date + Duration::days(1));
    }

    #[test]
    fn test_empty_group_is_an_error() {
        assert!(matches!(normalize_trend(&[]), Err(TrendError::EmptyGroup)));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let raw = vec![
            point("v1.0", 1, 1, 10.0),
            point("v2.0", 2, 2, 8.0),
            point("v3.0", 3, 3, 12.0),
        ];
        let once = normalize_trend(&raw).unwrap();
        let twice = normalize_trend(&once).unwrap();
        assert_eq!(once, twice);
    }
}
