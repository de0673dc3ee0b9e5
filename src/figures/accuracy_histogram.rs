// src/figures/accuracy_histogram.rs
//! Figure 8: efficiency gain of relaxed-accuracy BERT submissions
//!
//! For every (submission, version, date) that published both BERT-99.0 and
//! BERT-99.9 results, the percent efficiency increase of the relaxed
//! target over the strict one, as a histogram.

use crate::chart;
use crate::classify;
use crate::join::{self, JoinedRecord};
use crate::pipeline::{AliasRule, ParsePolicy, PipelineSpec};
use crate::table::{self, WorkloadMatch};
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const LOW_ACCURACY: &str = "bert-99.0";
const HIGH_ACCURACY: &str = "bert-99.9";

fn bert_spec() -> PipelineSpec {
    let mut spec = PipelineSpec::datacenter_inference();
    spec.name = "bert-accuracy".to_string();
    spec.parse_policy = ParsePolicy::Strict;
    spec.aliases = vec![
        AliasRule::new("rnnt", "rnn-t"),
        AliasRule::new("bert", "bert-99.0"),
        AliasRule::new("bert99.9", "bert-99.9"),
    ];
    // BERT never reports token rates.
    spec.performance_units.retain(|u| u != "Tokens/s");
    spec.tokens_per_sample = None;
    spec
}

/// Best efficiency per (submission, version, date) for each accuracy
/// target, then the percent increase where both targets are present.
fn efficiency_increases(joined: &[JoinedRecord]) -> Vec<f64> {
    let mut best: HashMap<(String, String, NaiveDate), (Option<f64>, Option<f64>)> = HashMap::new();
    for r in joined {
        let (Some(version), Some(date)) = (r.version.clone(), r.date) else {
            continue;
        };
        let slot = best
            .entry((r.public_id.clone(), version, date))
            .or_insert((None, None));
        let cell = if r.workload == LOW_ACCURACY {
            &mut slot.0
        } else {
            &mut slot.1
        };
        *cell = Some(cell.map_or(r.efficiency, |v| v.max(r.efficiency)));
    }

    best.values()
        .filter_map(|&(low, high)| Some((low? - high?) / high? * 100.0))
        .collect()
}

pub fn render(data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let spec = bert_spec();
    let input = data_dir.join("data_cleaned_inference_datacenter.csv");
    let records =
        table::load_records(&input, &spec).with_context(|| format!("loading {}", input.display()))?;
    let records = table::retain_workloads(records, &[LOW_ACCURACY, HIGH_ACCURACY], WorkloadMatch::Exact);
    let partition = classify::partition(records, &spec)?;
    let joined = join::join_and_derive(&partition, &spec);

    let increases = efficiency_increases(&joined);
    anyhow::ensure!(
        !increases.is_empty(),
        "no submissions with both BERT accuracy targets in {}",
        input.display()
    );

    let output = out_dir.join("figure8.png");
    chart::histogram_chart(
        &output,
        &increases,
        20,
        "Energy Efficiency Percent Increase (%)",
        "Frequency",
    )?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::JoinedRecord;

    fn joined(public_id: &str, workload: &str, efficiency: f64) -> JoinedRecord {
        JoinedRecord {
            public_id: public_id.to_string(),
            workload: workload.to_string(),
            scenario: Some("offline".to_string()),
            version: Some("v4.0".to_string()),
            version_ordinal: Some(4),
            date: NaiveDate::from_ymd_opt(2023, 11, 8),
            organization: None,
            accelerator: None,
            total_accelerators: None,
            performance: efficiency,
            power: 1.0,
            efficiency,
        }
    }

    #[test]
    fn test_increase_requires_both_targets() {
        let rows = vec![joined("A", LOW_ACCURACY, 12.0)];
        assert!(efficiency_increases(&rows).is_empty());
    }

    #[test]
    fn test_increase_uses_best_of_each_target() {
        let rows = vec![
            joined("A", LOW_ACCURACY, 10.0),
            joined("A", LOW_ACCURACY, 12.0),
            joined("A", HIGH_ACCURACY, 8.0),
        ];
        let increases = efficiency_increases(&rows);
        assert_eq!(increases.len(), 1);
        assert!((increases[0] - 50.0).abs() < 1e-9);
    }
}
