// src/figures/software_delta.rs
//! Figure 10: round-over-round efficiency deltas on fixed hardware
//!
//! Joins the datacenter table with the version label collapsed to its
//! integer ordinal, then compares consecutive rounds within each
//! (organization, accelerator model, accelerator count) configuration and
//! workload. Deltas below -50% are treated as resubmission artifacts and
//! discarded.

use crate::chart;
use crate::classify;
use crate::join::{self, JoinedRecord};
use crate::pipeline::{AliasRule, ParsePolicy, PipelineSpec};
use crate::table;
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DELTA_FLOOR_PERCENT: f64 = -50.0;

fn delta_spec() -> PipelineSpec {
    let mut spec = PipelineSpec::datacenter_inference();
    spec.name = "software-delta".to_string();
    spec.parse_policy = ParsePolicy::Strict;
    spec.aliases = vec![
        AliasRule::new("rnnt", "rnn-t"),
        AliasRule::new("bert", "bert-99.9"),
    ];
    spec.performance_units.retain(|u| u != "Tokens/s");
    spec.tokens_per_sample = None;
    spec.key.version_as_ordinal = true;
    spec.require_system_columns = true;
    spec
}

/// Percent efficiency change for every same-workload pair of consecutive
/// rounds within one hardware configuration.
fn consecutive_round_deltas(joined: &[JoinedRecord]) -> Vec<f64> {
    let mut groups: HashMap<(String, String, String), Vec<&JoinedRecord>> = HashMap::new();
    for r in joined {
        let (Some(org), Some(acc), Some(total)) =
            (&r.organization, &r.accelerator, &r.total_accelerators)
        else {
            continue;
        };
        groups
            .entry((org.clone(), acc.clone(), total.clone()))
            .or_default()
            .push(r);
    }

    let mut deltas = Vec::new();
    for rows in groups.values() {
        for old in rows {
            for new in rows {
                let (Some(old_round), Some(new_round)) =
                    (old.version_ordinal, new.version_ordinal)
                else {
                    continue;
                };
                if old.workload == new.workload && new_round == old_round + 1 {
                    let delta = (new.efficiency - old.efficiency) / old.efficiency * 100.0;
                    if delta >= DELTA_FLOOR_PERCENT {
                        deltas.push(delta);
                    }
                }
            }
        }
    }
    deltas
}

pub fn render(data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let spec = delta_spec();
    let input = data_dir.join("data_cleaned_inference_datacenter.csv");
    let records =
        table::load_records(&input, &spec).with_context(|| format!("loading {}", input.display()))?;
    let partition = classify::partition(records, &spec)?;
    let joined = join::join_and_derive(&partition, &spec);

    let deltas = consecutive_round_deltas(&joined);
    anyhow::ensure!(
        !deltas.is_empty(),
        "no consecutive-round submission pairs in {}",
        input.display()
    );
    log::info!(
        "{} of {} deltas are at or above +50%",
        deltas.iter().filter(|d| **d >= 50.0).count(),
        deltas.len()
    );

    let output = out_dir.join("figure10.png");
    chart::histogram_chart(
        &output,
        &deltas,
        20,
        "Energy Efficiency Percent Increase (%)",
        "Frequency",
    )?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn joined(round: u32, workload: &str, config: &str, efficiency: f64) -> JoinedRecord {
        JoinedRecord {
            public_id: format!("{round}.0-0001"),
            workload: workload.to_string(),
            scenario: Some("offline".to_string()),
            version: Some(format!("v{round}.0")),
            version_ordinal: Some(round),
            date: NaiveDate::from_ymd_opt(2022, 1, 1),
            organization: Some("Org".to_string()),
            accelerator: Some(config.to_string()),
            total_accelerators: Some("8".to_string()),
            performance: efficiency,
            power: 1.0,
            efficiency,
        }
    }

    #[test]
    fn test_consecutive_rounds_produce_one_delta() {
        let rows = vec![
            joined(2, "resnet", "A100", 10.0),
            joined(3, "resnet", "A100", 12.0),
        ];
        let deltas = consecutive_round_deltas(&rows);
        assert_eq!(deltas.len(), 1);
        assert!((deltas[0] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_adjacent_rounds_are_skipped() {
        let rows = vec![
            joined(2, "resnet", "A100", 10.0),
            joined(4, "resnet", "A100", 12.0),
        ];
        assert!(consecutive_round_deltas(&rows).is_empty());
    }

    #[test]
    fn test_different_hardware_not_compared() {
        let rows = vec![
            joined(2, "resnet", "A100", 10.0),
            joined(3, "resnet", "H100", 30.0),
        ];
        assert!(consecutive_round_deltas(&rows).is_empty());
    }

    #[test]
    fn test_large_regressions_discarded() {
        let rows = vec![
            joined(2, "resnet", "A100", 10.0),
            joined(3, "resnet", "A100", 1.0),
        ];
        assert!(consecutive_round_deltas(&rows).is_empty());
    }
}
