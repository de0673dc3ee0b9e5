// src/figures/power_scales.rs
//! Figure 2: min/max system power across the four benchmark classes
//!
//! Six orders of magnitude between a tiny microcontroller and a training
//! cluster, so the bars sit on a log axis and each carries a label in the
//! nearest sensible unit.

use crate::chart;
use crate::classify;
use crate::join;
use crate::pipeline::{ParsePolicy, PipelineSpec};
use crate::table::{self, WorkloadMatch};
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Largest published datacenter system; keeps the axis anchored when the
/// filtered rows top out lower.
const DATACENTER_POWER_FLOOR: f64 = 6280.2;

const TINY_WORKLOADS: &[&str] = &["mobilenetv1 (0.25x)", "resnet-v1", "dscnn", "fc autoencoder"];

/// Render a wattage in the nearest sensible unit.
pub fn format_watts(value: f64) -> String {
    if value < 1e-3 {
        format!("{:.1} uW", value * 1e6)
    } else if value < 1.0 {
        format!("{:.1} mW", value * 1e3)
    } else if value >= 1e6 {
        format!("{:.1} MW", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.1} kW", value / 1e3)
    } else {
        format!("{value:.1} W")
    }
}

fn extent(label: &str, values: &[f64]) -> anyhow::Result<(f64, f64)> {
    anyhow::ensure!(!values.is_empty(), "no power measurements for {label}");
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((lo, hi))
}

/// Tiny submissions report per-inference energy and latency; the quotient
/// uJ / (1000 * ms) is the average draw in watts.
fn tiny_watts(data_dir: &Path) -> anyhow::Result<Vec<f64>> {
    let spec = PipelineSpec::tiny();
    let input = data_dir.join("data_cleaned_tiny.csv");
    let records =
        table::load_records(&input, &spec).with_context(|| format!("loading {}", input.display()))?;
    let records = table::retain_workloads(records, TINY_WORKLOADS, WorkloadMatch::Exact);
    let partition = classify::partition(records, &spec)?;
    Ok(join::join_and_derive(&partition, &spec)
        .iter()
        .map(|r| r.power / (1000.0 * r.performance))
        .collect())
}

/// The power subset of an inference table, malformed rows dropped.
fn inference_watts(data_dir: &Path, file: &str, mut spec: PipelineSpec) -> anyhow::Result<Vec<f64>> {
    spec.parse_policy = ParsePolicy::Coerce;
    let input = data_dir.join(file);
    let records =
        table::load_records(&input, &spec).with_context(|| format!("loading {}", input.display()))?;
    let partition = classify::partition(records, &spec)?;
    Ok(partition.power.into_iter().map(|m| m.value).collect())
}

/// Training submissions report total kJ and time-to-train; the derived
/// efficiency value is already the average draw in watts.
fn training_watts(data_dir: &Path) -> anyhow::Result<Vec<f64>> {
    let spec = PipelineSpec::training();
    let input = data_dir.join("data_cleaned_training.csv");
    let records =
        table::load_records(&input, &spec).with_context(|| format!("loading {}", input.display()))?;
    let partition = classify::partition(records, &spec)?;
    Ok(join::join_and_derive(&partition, &spec)
        .iter()
        .map(|r| r.efficiency)
        .collect())
}

pub fn render(data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let labels = ["Tiny", "Edge", "Datacenter", "Training"];
    let sets = [
        tiny_watts(data_dir)?,
        inference_watts(
            data_dir,
            "data_cleaned_inference_edge.csv",
            PipelineSpec::edge_inference(),
        )?,
        inference_watts(
            data_dir,
            "data_cleaned_inference_datacenter.csv",
            PipelineSpec::datacenter_inference(),
        )?,
        training_watts(data_dir)?,
    ];

    let mut minima = Vec::with_capacity(labels.len());
    let mut maxima = Vec::with_capacity(labels.len());
    for (label, values) in labels.into_iter().zip(sets.iter()) {
        let (lo, hi) = extent(label, values)?;
        minima.push(lo);
        maxima.push(hi);
    }
    if maxima[2] < DATACENTER_POWER_FLOOR {
        maxima[2] = DATACENTER_POWER_FLOOR;
    }

    let output = out_dir.join("figure2.png");
    chart::power_range_chart(
        &output,
        &labels,
        &minima,
        &maxima,
        "System Type",
        "Power Consumption (W)",
        &format_watts,
    )?;
    Ok(output)
}
