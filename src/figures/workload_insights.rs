// src/figures/workload_insights.rs
//! Figure 7: energy per inference and MAC operations per workload
//!
//! Per-workload joules per sample from one tiny submission (1.2-0004) and
//! one datacenter submission (4.0-0063), sorted within each class from
//! most to least energy-hungry, with total MAC counts on a secondary axis.
//! The Llama2 submission reported per-token energy; it is scaled by the
//! benchmark's tokens per sample.

use crate::chart;
use crate::pipeline::TOKENS_PER_SAMPLE;
use std::path::{Path, PathBuf};

struct WorkloadEnergy {
    name: &'static str,
    joules_per_sample: f64,
    mac_ops: f64,
}

fn datacenter_workloads() -> Vec<WorkloadEnergy> {
    vec![
        WorkloadEnergy {
            name: "3D UNet-99.9",
            joules_per_sample: 110.4422926,
            mac_ops: 3.425e13,
        },
        WorkloadEnergy {
            name: "Stable Diffusion",
            joules_per_sample: 492.3917098,
            mac_ops: 1.35394e14,
        },
        WorkloadEnergy {
            name: "DLRM-v2-99.9",
            joules_per_sample: 0.01981354463,
            mac_ops: 4_328_225_500.0,
        },
        WorkloadEnergy {
            name: "GPTJ-99.9",
            joules_per_sample: 26.77803242,
            mac_ops: 5.3075e12,
        },
        WorkloadEnergy {
            name: "Llama2-99.9",
            joules_per_sample: 0.3815189837 * TOKENS_PER_SAMPLE,
            mac_ops: 2.32727e13,
        },
        WorkloadEnergy {
            name: "ResNet Inf",
            joules_per_sample: 0.008687140755,
            mac_ops: 4_089_282_560.0,
        },
        WorkloadEnergy {
            name: "RetinaNet",
            joules_per_sample: 0.4549045607,
            mac_ops: 2.01e11,
        },
        WorkloadEnergy {
            name: "RNN-T",
            joules_per_sample: 0.03166273635,
            mac_ops: 6_314_132_597.0,
        },
        WorkloadEnergy {
            name: "BERT-99.9",
            joules_per_sample: 0.1107200351,
            mac_ops: 59_793_997_800.0,
        },
    ]
}

fn tiny_workloads() -> Vec<WorkloadEnergy> {
    vec![
        WorkloadEnergy {
            name: "AutoEncoder",
            joules_per_sample: 5.25e-6,
            mac_ops: 264_192.0,
        },
        WorkloadEnergy {
            name: "DSCNN",
            joules_per_sample: 18.56e-6,
            mac_ops: 2_664_768.0,
        },
        WorkloadEnergy {
            name: "MobileNet",
            joules_per_sample: 40.8e-6,
            mac_ops: 7_491_968.0,
        },
        WorkloadEnergy {
            name: "ResNet Tiny",
            joules_per_sample: 27.17e-6,
            mac_ops: 12_534_400.0,
        },
    ]
}

pub fn render(_data_dir: &Path, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let mut datacenter = datacenter_workloads();
    let mut tiny = tiny_workloads();
    datacenter.sort_by(|a, b| b.joules_per_sample.total_cmp(&a.joules_per_sample));
    tiny.sort_by(|a, b| b.joules_per_sample.total_cmp(&a.joules_per_sample));

    let mut labels = Vec::new();
    let mut energies = Vec::new();
    let mut colors = Vec::new();
    let mut macs = Vec::new();
    for (class_idx, class) in [datacenter, tiny].iter().enumerate() {
        for workload in class {
            labels.push(workload.name.to_string());
            energies.push(workload.joules_per_sample);
            colors.push(class_idx);
            macs.push(workload.mac_ops);
        }
    }

    let legend = [
        ("Datacenter".to_string(), 0usize),
        ("Tiny".to_string(), 1usize),
    ];

    let output = out_dir.join("figure7.png");
    chart::workload_energy_chart(
        &output,
        &labels,
        &energies,
        &colors,
        &legend,
        "MAC Operations",
        &macs,
        "Energy per Inference (Joules/Sample)",
        "Total MAC Operations",
    )?;
    Ok(output)
}
