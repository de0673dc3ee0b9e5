// src/join/mod.rs
//! Inner join of the performance and power subsets plus efficiency derivation
//!
//! Relational semantics: every performance row pairs with every power row
//! sharing its key. Rows missing a key component, and pairs whose
//! denominator is non-positive, produce nothing.

use crate::classify::{Measurement, Partition};
use crate::pipeline::{Derivation, KeySpec, PipelineSpec};
use chrono::NaiveDate;
use std::collections::HashMap;

/// One matched (performance, power) pair with its derived efficiency.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub public_id: String,
    pub workload: String,
    pub scenario: Option<String>,
    pub version: Option<String>,
    pub version_ordinal: Option<u32>,
    pub date: Option<NaiveDate>,
    pub organization: Option<String>,
    pub accelerator: Option<String>,
    pub total_accelerators: Option<String>,
    pub performance: f64,
    pub power: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct JoinKey {
    public_id: String,
    workload: String,
    scenario: Option<String>,
    version: Option<String>,
    date: Option<NaiveDate>,
}

impl JoinKey {
    /// Build the key for one measurement; `None` when a component the key
    /// needs is absent (such rows cannot participate in the join).
    fn build(m: &Measurement, key: &KeySpec) -> Option<Self> {
        let record = &m.record;
        let version = if key.version {
            if key.version_as_ordinal {
                Some(record.version_ordinal?.to_string())
            } else {
                Some(record.version.clone()?)
            }
        } else {
            None
        };
        Some(Self {
            public_id: record.public_id.clone(),
            workload: record.workload.clone(),
            scenario: if key.scenario {
                Some(record.scenario.clone()?)
            } else {
                None
            },
            version,
            date: if key.date { Some(record.date?) } else { None },
        })
    }
}

fn derive_efficiency(performance: f64, power: f64, derivation: &Derivation) -> Option<f64> {
    let value = match derivation {
        Derivation::ThroughputOverPower => {
            if power <= 0.0 {
                return None;
            }
            performance / power
        }
        Derivation::InverseLatency => {
            if power <= 0.0 {
                return None;
            }
            1.0 / power
        }
        Derivation::EnergyOverLatency {
            unit_scale,
            time_scale,
        } => {
            if performance <= 0.0 {
                return None;
            }
            power * unit_scale / (time_scale * performance)
        }
    };
    value.is_finite().then_some(value)
}

/// Inner-join the partition on the configured key and derive efficiency.
pub fn join_and_derive(partition: &Partition, spec: &PipelineSpec) -> Vec<JoinedRecord> {
    let mut power_by_key: HashMap<JoinKey, Vec<&Measurement>> = HashMap::new();
    for m in &partition.power {
        if let Some(key) = JoinKey::build(m, &spec.key) {
            power_by_key.entry(key).or_default().push(m);
        }
    }

    let mut joined = Vec::new();
    for perf in &partition.performance {
        let Some(key) = JoinKey::build(perf, &spec.key) else {
            continue;
        };
        let Some(matches) = power_by_key.get(&key) else {
            continue;
        };
        for power in matches {
            let Some(efficiency) = derive_efficiency(perf.value, power.value, &spec.derivation)
            else {
                continue;
            };
            let record = &perf.record;
            joined.push(JoinedRecord {
                public_id: record.public_id.clone(),
                workload: record.workload.clone(),
                scenario: record.scenario.clone(),
                version: record.version.clone(),
                version_ordinal: record.version_ordinal,
                date: record.date,
                organization: record.organization.clone(),
                accelerator: record.accelerator.clone(),
                total_accelerators: record.total_accelerators.clone(),
                performance: perf.value,
                power: power.value,
                efficiency,
            });
        }
    }

    log::debug!(
        "pipeline {}: joined {} of {} performance rows against {} power rows",
        spec.name,
        joined.len(),
        partition.performance.len(),
        partition.power.len()
    );
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineSpec;
    use crate::table::BenchmarkRecord;
    use chrono::NaiveDate;

    fn measurement(public_id: &str, workload: &str, units: &str, value: f64) -> Measurement {
        Measurement {
            record: BenchmarkRecord {
                public_id: public_id.to_string(),
                workload: workload.to_string(),
                scenario: Some("offline".to_string()),
                version: Some("v3.0".to_string()),
                version_ordinal: Some(3),
                date: NaiveDate::from_ymd_opt(2023, 1, 1),
                units: units.to_string(),
                result_text: value.to_string(),
                organization: None,
                accelerator: None,
                total_accelerators: None,
            },
            value,
        }
    }

    #[test]
    fn test_join_example_from_matching_keys() {
        let partition = Partition {
            performance: vec![measurement("A", "bert-99.0", "Samples/s", 100.0)],
            power: vec![measurement("A", "bert-99.0", "Watts", 20.0)],
        };
        let joined = join_and_derive(&partition, &PipelineSpec::datacenter_inference());
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].efficiency, 5.0);
    }

    #[test]
    fn test_join_miss_is_silently_dropped() {
        let partition = Partition {
            performance: vec![measurement("A", "bert-99.0", "Samples/s", 100.0)],
            power: vec![measurement("B", "bert-99.0", "Watts", 20.0)],
        };
        let joined = join_and_derive(&partition, &PipelineSpec::datacenter_inference());
        assert!(joined.is_empty());
    }

    #[test]
    fn test_cross_product_within_key_group() {
        let partition = Partition {
            performance: vec![
                measurement("A", "resnet", "Samples/s", 100.0),
                measurement("A", "resnet", "Samples/s", 200.0),
            ],
            power: vec![
                measurement("A", "resnet", "Watts", 10.0),
                measurement("A", "resnet", "Watts", 20.0),
            ],
        };
        let joined = join_and_derive(&partition, &PipelineSpec::datacenter_inference());
        assert_eq!(joined.len(), 4);
    }

    #[test]
    fn test_non_positive_power_produces_no_row() {
        let partition = Partition {
            performance: vec![measurement("A", "resnet", "Samples/s", 100.0)],
            power: vec![measurement("A", "resnet", "Watts", 0.0)],
        };
        let joined = join_and_derive(&partition, &PipelineSpec::datacenter_inference());
        assert!(joined.is_empty());
    }

    #[test]
    fn test_inverse_latency_derivation() {
        let partition = Partition {
            performance: vec![measurement("A", "dscnn", "Latency in ms", 2.0)],
            power: vec![measurement("A", "dscnn", "Energy in uJ", 4.0)],
        };
        let joined = join_and_derive(&partition, &PipelineSpec::tiny());
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].efficiency, 0.25);
    }

    #[test]
    fn test_energy_over_latency_derivation() {
        // 15.08 kJ over 5.488 minutes is about 45.8 average watts.
        let partition = Partition {
            performance: vec![measurement("A", "bert", "Latency (In minutes)", 5.488)],
            power: vec![measurement("A", "bert", "kJ", 15.08)],
        };
        // The training key ignores scenario/version/date, so the synthetic
        // records join on (id, workload) alone.
        let joined = join_and_derive(&partition, &PipelineSpec::training());
        assert_eq!(joined.len(), 1);
        let watts = 15.08 * 1000.0 / (60.0 * 5.488);
        assert!((joined[0].efficiency - watts).abs() < 1e-9);
    }

    #[test]
    fn test_missing_key_component_excludes_row() {
        let mut perf = measurement("A", "resnet", "Samples/s", 100.0);
        perf.record.date = None;
        let partition = Partition {
            performance: vec![perf],
            power: vec![measurement("A", "resnet", "Watts", 10.0)],
        };
        let joined = join_and_derive(&partition, &PipelineSpec::datacenter_inference());
        assert!(joined.is_empty());
    }
}
