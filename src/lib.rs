// src/lib.rs
//! MLPerf power/efficiency results analysis
//! Pipelines from the published CSV tables to the rendered paper figures

pub mod chart;
pub mod classify;
pub mod figures;
pub mod join;
pub mod pipeline;
pub mod table;
pub mod trend;
