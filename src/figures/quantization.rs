// src/figures/quantization.rs
//! Figure 9: quantization efficiency across benchmark versions
//!
//! BERT-99.9 efficiency relative to BERT-99.0 on comparable 8-accelerator
//! submissions from six benchmark rounds (1.0-73, 1.1-048, 2.0-095,
//! 2.1-0089, 3.1-0109, 4.0-0063). The gap narrows as high-accuracy
//! submissions adopt lower-precision numerics.

use crate::chart::{self, BarOptions, BarSeries};
use std::path::{Path, PathBuf};

const VERSIONS: &[&str] = &["v1.0", "v1.1", "v2.0", "v2.1", "v3.1", "v4.0"];
const LOW_ACCURACY: [f64; 6] = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
const HIGH_ACCURACY: [f64; 6] = [0.495, 0.489, 0.483, 0.504, 0.798, 0.854];

pub fn render(_data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let series = [
        BarSeries {
            name: "BERT-99.0 Low Accuracy".to_string(),
            values: LOW_ACCURACY.to_vec(),
        },
        BarSeries {
            name: "BERT-99.9 High Accuracy".to_string(),
            values: HIGH_ACCURACY.to_vec(),
        },
    ];

    let output = out_dir.join("figure9.png");
    chart::grouped_bar_chart(
        &output,
        VERSIONS,
        &series,
        &BarOptions {
            x_desc: "MLPerf Inference Benchmark Version",
            y_desc: "Energy Efficiency (Samples/Joule) Normalized to BERT-99.0",
            y_max: Some(1.25),
            reference_line: None,
            value_labels: None,
        },
    )?;
    Ok(output)
}
