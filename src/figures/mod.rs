// src/figures/mod.rs
//! Figure registry and batch rendering
//!
//! One entry per published figure. Every renderer has the same shape: read
//! from the data directory, write one PNG into the output directory.

pub mod accuracy_histogram;
pub mod inference_trends;
pub mod optimizations;
pub mod perf_trends;
pub mod power_scales;
pub mod quantization;
pub mod software_delta;
pub mod training_energy;
pub mod workload_insights;

use anyhow::Context;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// One renderable figure.
pub struct FigureJob {
    pub name: &'static str,
    pub about: &'static str,
    pub render: fn(&Path, &Path) -> anyhow::Result<PathBuf>,
}

pub const FIGURES: &[FigureJob] = &[
    FigureJob {
        name: "figure1",
        about: "Normalized inference performance per benchmark round",
        render: perf_trends::render,
    },
    FigureJob {
        name: "figure2",
        about: "Min/max system power across the four benchmark classes",
        render: power_scales::render,
    },
    FigureJob {
        name: "figure5a",
        about: "Datacenter inference efficiency trends",
        render: inference_trends::render_datacenter,
    },
    FigureJob {
        name: "figure5b",
        about: "Edge inference efficiency trends",
        render: inference_trends::render_edge,
    },
    FigureJob {
        name: "figure5c",
        about: "Tiny inference efficiency trends",
        render: inference_trends::render_tiny,
    },
    FigureJob {
        name: "figure6",
        about: "Training energy breakdown versus time-to-train",
        render: training_energy::render,
    },
    FigureJob {
        name: "figure7",
        about: "Energy per inference and MAC operations per workload",
        render: workload_insights::render,
    },
    FigureJob {
        name: "figure8",
        about: "Efficiency gain of relaxed-accuracy BERT submissions",
        render: accuracy_histogram::render,
    },
    FigureJob {
        name: "figure9",
        about: "Quantization efficiency across benchmark versions",
        render: quantization::render,
    },
    FigureJob {
        name: "figure10",
        about: "Round-over-round efficiency deltas on fixed hardware",
        render: software_delta::render,
    },
    FigureJob {
        name: "figure11a",
        about: "Software optimization scores on a fixed edge system",
        render: optimizations::render_software,
    },
    FigureJob {
        name: "figure11b",
        about: "Hardware generation scores across TPU versions",
        render: optimizations::render_hardware,
    },
];

/// Look up a figure by its registry name.
pub fn by_name(name: &str) -> Option<&'static FigureJob> {
    FIGURES.iter().find(|job| job.name == name)
}

/// Render every registered figure, in parallel, failing on the first error.
pub fn render_all(data_dir: &Path, out_dir: &Path) -> anyhow::Result<()> {
    FIGURES.par_iter().try_for_each(|job| {
        (job.render)(data_dir, out_dir)
            .map(drop)
            .with_context(|| format!("rendering {}", job.name))
    })
}
