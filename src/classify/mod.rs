// src/classify/mod.rs
//! Row classification into performance and power subsets
//!
//! Membership is by exact unit-label match against the pipeline's two
//! vocabularies; rows matching neither are dropped without comment. Token
//! rates are rescaled to sample rates here so downstream derivation sees
//! comparable values.

use crate::pipeline::{ParsePolicy, PipelineSpec};
use crate::table::{self, BenchmarkRecord, TableError};

/// A classified row with its cleaned numeric value.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub record: BenchmarkRecord,
    pub value: f64,
}

/// The two measurement subsets feeding the join.
#[derive(Debug, Default)]
pub struct Partition {
    pub performance: Vec<Measurement>,
    pub power: Vec<Measurement>,
}

fn parse_value(text: &str, policy: ParsePolicy) -> Result<Option<f64>, TableError> {
    match policy {
        ParsePolicy::Strict => table::clean_numeric(text).map(Some),
        ParsePolicy::Coerce => Ok(table::coerce_numeric(text)),
    }
}

/// Partition records by unit label and parse their values.
///
/// Power rows pass the pipeline's guards before parsing, so a strict
/// pipeline is not aborted by rows the guards are there to discard.
pub fn partition(
    records: Vec<BenchmarkRecord>,
    spec: &PipelineSpec,
) -> Result<Partition, TableError> {
    let mut partition = Partition::default();
    let mut skipped_units = 0usize;

    for record in records {
        if spec.performance_units.iter().any(|u| *u == record.units) {
            let Some(mut value) = parse_value(&record.result_text, spec.parse_policy)? else {
                continue;
            };
            if let Some(tokens_per_sample) = spec.tokens_per_sample {
                if record.units.to_lowercase().contains("tokens/s") {
                    value /= tokens_per_sample;
                }
            }
            partition.performance.push(Measurement { record, value });
        } else if spec.power_units.iter().any(|u| *u == record.units) {
            let guard = &spec.power_guard;
            if guard.drop_embedded_urls && record.result_text.to_lowercase().contains("http") {
                continue;
            }
            if guard.require_plain_numeric && !table::is_plain_numeric(record.result_text.trim()) {
                continue;
            }
            let Some(value) = parse_value(&record.result_text, spec.parse_policy)? else {
                continue;
            };
            partition.power.push(Measurement { record, value });
        } else {
            skipped_units += 1;
        }
    }

    log::debug!(
        "pipeline {}: {} performance rows, {} power rows, {} rows outside both vocabularies",
        spec.name,
        partition.performance.len(),
        partition.power.len(),
        skipped_units
    );
    Ok(partition)
}
