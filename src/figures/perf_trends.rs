// src/figures/perf_trends.rs
//! Figure 1: normalized inference performance per benchmark round
//!
//! Reads the wide-format performance table (one row per benchmark, one
//! column per publication date, values already normalized to each
//! benchmark's first appearance) and draws the trend lines alongside the
//! Moore's Law reference row.

use crate::chart::{self, TrendSeries};
use crate::table;
use anyhow::Context;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Publication date of each benchmark round, for the version x-axis ticks.
const VERSION_DATES: &[(&str, (i32, u32, u32))] = &[
    ("v0.5", (2018, 12, 12)),
    ("v0.6", (2019, 6, 10)),
    ("v1.0", (2020, 7, 29)),
    ("v1.1", (2021, 6, 30)),
    ("v2.0", (2021, 12, 1)),
    ("v2.1", (2022, 6, 29)),
    ("v3.0", (2022, 11, 9)),
    ("v3.1", (2023, 6, 28)),
    ("v4.0", (2023, 11, 8)),
    ("v4.1", (2024, 6, 12)),
];

const BENCHMARKS: &[&str] = &[
    "ResNet",
    "3D U-Net",
    "RetinaNet",
    "Mask R-CNN",
    "DLRM",
    "GPT-J",
    "Stable Diffusion v2",
    "Moore's Law",
];

pub fn render(data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let input = data_dir.join("data_performance.csv");
    let table =
        table::load_wide_table(&input).with_context(|| format!("loading {}", input.display()))?;

    let mut series = Vec::new();
    for &name in BENCHMARKS {
        match table.series(name) {
            Some(points) if !points.is_empty() => series.push(TrendSeries {
                name: name.to_string(),
                points,
            }),
            _ => log::warn!("benchmark {name} absent from {}", input.display()),
        }
    }

    // Only rounds inside the table's date span get a tick.
    let first = table.dates.iter().min().copied();
    let last = table.dates.iter().max().copied();
    let ticks: Vec<(NaiveDate, String)> = VERSION_DATES
        .iter()
        .filter_map(|(label, (y, m, d))| {
            let date = NaiveDate::from_ymd_opt(*y, *m, *d)?;
            (Some(date) >= first && Some(date) <= last)
                .then(|| (date, label.to_string()))
        })
        .collect();

    let output = out_dir.join("figure1.png");
    chart::trend_chart(
        &output,
        "MLPerf Inference Benchmark Version",
        "Normalized Performance",
        &series,
        Some((1.0, 64.0)),
        &ticks,
    )?;
    Ok(output)
}
