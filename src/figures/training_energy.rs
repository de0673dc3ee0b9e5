// src/figures/training_energy.rs
//! Figure 6: training energy breakdown versus time-to-train
//!
//! Measured on comparable v4.0 training submissions (8, 64 and 512
//! accelerators of the same generation). Compute and interconnect energy
//! stack on the primary axis, time-to-train rides the secondary one.

use crate::chart::{self, BarSeries};
use std::path::{Path, PathBuf};

const ACCELERATOR_COUNTS: &[&str] = &["8", "64", "512"];
const COMPUTE_ENERGY_MJ: [f64; 3] = [11.77, 15.08, 38.64];
const INTERCONNECT_ENERGY_MJ: [f64; 3] = [0.0, 5.3, 7.2];
const TIME_TO_TRAIN_MINUTES: [f64; 3] = [29.101, 5.488, 2.015];

pub fn render(_data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let segments = [
        BarSeries {
            name: "Compute Energy (MJ)".to_string(),
            values: COMPUTE_ENERGY_MJ.to_vec(),
        },
        BarSeries {
            name: "Interconnect Energy (MJ)".to_string(),
            values: INTERCONNECT_ENERGY_MJ.to_vec(),
        },
    ];

    let output = out_dir.join("figure6.png");
    chart::stacked_bar_line_chart(
        &output,
        ACCELERATOR_COUNTS,
        &segments,
        "Time-to-Train (mins)",
        &TIME_TO_TRAIN_MINUTES,
        "Number of Accelerators",
        "Energy (MJ)",
        "Time-to-Train (mins)",
    )?;
    Ok(output)
}
