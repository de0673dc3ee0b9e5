// src/figures/inference_trends.rs
//! Figures 5a-5c: normalized efficiency trends per inference class
//!
//! Each figure runs its class's pipeline end to end, then normalizes one
//! trend per tracked workload. A workload with no joined measurements is
//! skipped with a warning rather than failing the whole figure.

use crate::chart::{self, TrendSeries};
use crate::classify;
use crate::join::{self, JoinedRecord};
use crate::pipeline::PipelineSpec;
use crate::table::{self, WorkloadMatch};
use crate::trend;
use anyhow::Context;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// (filter pattern, legend label) per tracked workload.
const DATACENTER_WORKLOADS: &[(&str, &str)] = &[
    ("retinanet", "RetinaNet"),
    ("bert-99.0", "BERT-99.0"),
    ("resnet", "ResNet"),
    ("rnn-t", "RNN-T"),
    ("gptj-99.0", "GPTJ-99.0"),
    ("dlrm-v2-99.0", "DLRM-v2-99.0"),
    ("llama2-70b-99.9", "Llama2-70b-99.9"),
];

const EDGE_WORKLOADS: &[(&str, &str)] = &[
    ("retinanet", "RetinaNet"),
    ("bert-99.0", "BERT-99.0"),
    ("resnet", "ResNet"),
    ("rnn-t", "RNN-T"),
];

const TINY_WORKLOADS: &[(&str, &str)] = &[
    ("mobilenet", "MobileNet"),
    ("resnet", "ResNet"),
    ("dscnn", "DSCNN"),
    ("autoencoder", "AutoEncoder"),
];

fn joined_records(
    data_dir: &Path,
    file: &str,
    spec: &PipelineSpec,
    workloads: &[(&str, &str)],
    mode: WorkloadMatch,
) -> anyhow::Result<Vec<JoinedRecord>> {
    let input = data_dir.join(file);
    let records =
        table::load_records(&input, spec).with_context(|| format!("loading {}", input.display()))?;
    let patterns: Vec<&str> = workloads.iter().map(|(p, _)| *p).collect();
    let records = table::retain_workloads(records, &patterns, mode);
    let partition = classify::partition(records, spec)?;
    Ok(join::join_and_derive(&partition, spec))
}

/// Normalize one trend per workload, matching with the same mode used to
/// filter the table so substring classes stay together.
fn workload_trends(
    joined: &[JoinedRecord],
    workloads: &[(&str, &str)],
    mode: WorkloadMatch,
) -> Vec<TrendSeries> {
    let mut series = Vec::new();
    for (pattern, label) in workloads {
        let group: Vec<&JoinedRecord> = joined
            .iter()
            .filter(|r| match mode {
                WorkloadMatch::Exact => r.workload == *pattern,
                WorkloadMatch::Substring => r.workload.contains(pattern),
            })
            .collect();
        let points = trend::category_points(&group);
        match trend::normalize_trend(&points) {
            Ok(normalized) => series.push(TrendSeries {
                name: label.to_string(),
                points: normalized.iter().map(|p| (p.date, p.value)).collect(),
            }),
            Err(_) => log::warn!("no usable measurements for {label}; skipping its trend"),
        }
    }
    series
}

/// Version x-axis ticks at each round's first submission date.
fn version_ticks(joined: &[JoinedRecord]) -> Vec<(NaiveDate, String)> {
    let mut first_seen: HashMap<String, NaiveDate> = HashMap::new();
    for r in joined {
        let (Some(version), Some(date)) = (&r.version, r.date) else {
            continue;
        };
        first_seen
            .entry(version.clone())
            .and_modify(|d| {
                if date < *d {
                    *d = date;
                }
            })
            .or_insert(date);
    }
    let mut ticks: Vec<(NaiveDate, String)> =
        first_seen.into_iter().map(|(v, d)| (d, v)).collect();
    ticks.sort();
    ticks
}

pub fn render_datacenter(data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let spec = PipelineSpec::datacenter_inference();
    let joined = joined_records(
        data_dir,
        "data_cleaned_inference_datacenter.csv",
        &spec,
        DATACENTER_WORKLOADS,
        WorkloadMatch::Substring,
    )?;
    let series = workload_trends(&joined, DATACENTER_WORKLOADS, WorkloadMatch::Substring);

    let output = out_dir.join("figure5a.png");
    chart::trend_chart(
        &output,
        "MLPerf Datacenter Benchmark Version",
        "Normalized Energy Efficiency (Samples/Joule)",
        &series,
        None,
        &version_ticks(&joined),
    )?;
    Ok(output)
}

pub fn render_edge(data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let spec = PipelineSpec::edge_inference();
    let joined = joined_records(
        data_dir,
        "data_cleaned_inference_edge.csv",
        &spec,
        EDGE_WORKLOADS,
        WorkloadMatch::Exact,
    )?;
    let series = workload_trends(&joined, EDGE_WORKLOADS, WorkloadMatch::Exact);

    let output = out_dir.join("figure5b.png");
    chart::trend_chart(
        &output,
        "MLPerf Edge Benchmark Version",
        "Normalized Energy Efficiency (Samples/Joule)",
        &series,
        None,
        &version_ticks(&joined),
    )?;
    Ok(output)
}

pub fn render_tiny(data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let spec = PipelineSpec::tiny();
    let joined = joined_records(
        data_dir,
        "data_cleaned_tiny.csv",
        &spec,
        TINY_WORKLOADS,
        WorkloadMatch::Substring,
    )?;
    let series = workload_trends(&joined, TINY_WORKLOADS, WorkloadMatch::Substring);

    let output = out_dir.join("figure5c.png");
    chart::trend_chart(
        &output,
        "MLPerf Tiny Benchmark Version",
        "Normalized Energy Efficiency (Samples/Joule)",
        &series,
        None,
        &version_ticks(&joined),
    )?;
    Ok(output)
}
