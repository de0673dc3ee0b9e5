// src/figures/optimizations.rs
//! Figures 11a/11b: optimization scores on fixed hardware lines
//!
//! Both figures show efficiency, performance and power normalized to the
//! first version, with a dashed unity line. 11a tracks ResNet on a
//! GIGABYTE R282 across edge rounds (submissions 1.1-124, 2.0-132,
//! 3.0-0101, 3.1-0127), so the gains are software alone. 11b tracks TPU
//! generations as reported by the hardware provider.

use crate::chart::{self, BarOptions, BarSeries};
use std::path::{Path, PathBuf};

fn scores_chart(
    path: &Path,
    versions: &[&str],
    efficiency: &[f64],
    performance: &[f64],
    power: &[f64],
    x_desc: &str,
    y_max: f64,
) -> anyhow::Result<()> {
    let series = [
        BarSeries {
            name: "Energy Efficiency".to_string(),
            values: efficiency.to_vec(),
        },
        BarSeries {
            name: "Performance".to_string(),
            values: performance.to_vec(),
        },
        BarSeries {
            name: "Power".to_string(),
            values: power.to_vec(),
        },
    ];
    chart::grouped_bar_chart(
        path,
        versions,
        &series,
        &BarOptions {
            x_desc,
            y_desc: "Normalized Score",
            y_max: Some(y_max),
            reference_line: Some(1.0),
            value_labels: Some(&|v| format!("{v:.2}")),
        },
    )?;
    Ok(())
}

pub fn render_software(_data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let output = out_dir.join("figure11a.png");
    scores_chart(
        &output,
        &["v1.1", "v2.0", "v3.0", "v3.1"],
        &[1.0, 1.097595568, 1.136507966, 1.277909616],
        &[1.0, 0.9118800273, 0.9644309686, 0.9875033259],
        &[1.0, 0.83079784, 0.8485914729, 0.7727489591],
        "MLPerf ResNet Benchmark Version",
        1.8,
    )?;
    Ok(output)
}

pub fn render_hardware(_data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let output = out_dir.join("figure11b.png");
    scores_chart(
        &output,
        &["v2", "v3", "v4", "v5"],
        &[1.0, 1.694915254, 2.702702703, 4.0],
        &[1.0, 1.052631579, 1.724137931, 1.538461538],
        &[1.0, 0.6210526316, 0.6379310345, 0.3846153846],
        "Hardware Version",
        4.99,
    )?;
    Ok(output)
}
