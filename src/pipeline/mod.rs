// src/pipeline/mod.rs
//! Pipeline configuration for the join/normalize analysis
//!
//! Every figure runs the same clean -> classify -> join -> derive shape with
//! small variations. This module makes those variations explicit: unit
//! vocabularies, join key columns, the efficiency derivation rule, the parse
//! policy and the per-figure workload alias table all live on one spec.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tokens generated per sample for the token-rate benchmarks; used to turn
/// a Tokens/s figure into an equivalent Samples/s figure.
pub const TOKENS_PER_SAMPLE: f64 = 292.0;

/// How a numeric result field that fails to parse is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParsePolicy {
    /// Abort the run on the first malformed value.
    Strict,
    /// Drop the row silently and keep going.
    Coerce,
}

/// Workload-name rewrite applied after lowercasing, exact match only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRule {
    pub from: String,
    pub to: String,
}

impl AliasRule {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Columns participating in the perf/power join key. Submission id and
/// workload name are always part of the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySpec {
    pub scenario: bool,
    pub version: bool,
    pub date: bool,
    /// Collapse the version label to its integer ordinal before joining.
    pub version_as_ordinal: bool,
}

impl KeySpec {
    /// The full inference key: (Public ID, Model MLC, Scenario, version, date).
    pub fn full() -> Self {
        Self {
            scenario: true,
            version: true,
            date: true,
            version_as_ordinal: false,
        }
    }

    /// The training key: (Public ID, Model MLC) only.
    pub fn submission_and_workload() -> Self {
        Self {
            scenario: false,
            version: false,
            date: false,
            version_as_ordinal: false,
        }
    }
}

/// Extra admission checks applied to power/energy rows before parsing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerGuard {
    /// Drop rows whose result text embeds a URL (stray submission links).
    pub drop_embedded_urls: bool,
    /// Only admit results matching a plain `digits[.digits]` form.
    pub require_plain_numeric: bool,
}

/// Efficiency derivation rule applied to each joined (performance, power) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Derivation {
    /// performance / power (samples per joule).
    ThroughputOverPower,
    /// 1 / power, where the "power" rows actually carry an energy-per-op value.
    InverseLatency,
    /// power * unit_scale / (time_scale * performance).
    EnergyOverLatency { unit_scale: f64, time_scale: f64 },
}

/// Complete configuration of one analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: String,
    /// Column carrying the measured value ("Result" for inference tables,
    /// "Avg. Result at System Name" for training).
    pub value_column: String,
    pub parse_policy: ParsePolicy,
    pub aliases: Vec<AliasRule>,
    /// Keep only rows whose (lowercased) scenario equals this label.
    pub scenario_filter: Option<String>,
    /// Remove interior whitespace from the scenario label before comparing.
    pub strip_scenario_whitespace: bool,
    pub performance_units: Vec<String>,
    pub power_units: Vec<String>,
    /// Divide token-rate results by this many tokens per sample.
    pub tokens_per_sample: Option<f64>,
    pub power_guard: PowerGuard,
    pub key: KeySpec,
    pub derivation: Derivation,
    /// Require the Organization / accelerator / Total Accelerators columns.
    pub require_system_columns: bool,
}

/// The unit labels marking a throughput measurement in the inference tables.
fn inference_performance_units() -> Vec<String> {
    ["queries/s", "samples/s", "Samples/s", "Queries/s"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// The unit labels marking a system power measurement.
fn inference_power_units() -> Vec<String> {
    ["System Power (W)", "Power (W)", "System Power", "Watts"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl PipelineSpec {
    /// Datacenter inference: throughput over power, token rates rescaled,
    /// tolerant numeric parsing.
    pub fn datacenter_inference() -> Self {
        let mut performance_units = inference_performance_units();
        performance_units.push("Tokens/s".to_string());
        Self {
            name: "datacenter-inference".to_string(),
            value_column: "Result".to_string(),
            parse_policy: ParsePolicy::Coerce,
            aliases: vec![
                AliasRule::new("rnnt", "rnn-t"),
                AliasRule::new("bert", "bert-99.0"),
            ],
            scenario_filter: Some("offline".to_string()),
            strip_scenario_whitespace: false,
            performance_units,
            power_units: inference_power_units(),
            tokens_per_sample: Some(TOKENS_PER_SAMPLE),
            power_guard: PowerGuard::default(),
            key: KeySpec::full(),
            derivation: Derivation::ThroughputOverPower,
            require_system_columns: false,
        }
    }

    /// Edge inference: strict parsing, URL-bearing power rows dropped.
    pub fn edge_inference() -> Self {
        Self {
            name: "edge-inference".to_string(),
            value_column: "Result".to_string(),
            parse_policy: ParsePolicy::Strict,
            aliases: vec![
                AliasRule::new("rnnt", "rnn-t"),
                AliasRule::new("bert-99", "bert-99.0"),
            ],
            scenario_filter: Some("offline".to_string()),
            strip_scenario_whitespace: true,
            performance_units: inference_performance_units(),
            power_units: inference_power_units(),
            tokens_per_sample: None,
            power_guard: PowerGuard {
                drop_embedded_urls: true,
                require_plain_numeric: false,
            },
            key: KeySpec::full(),
            derivation: Derivation::ThroughputOverPower,
            require_system_columns: false,
        }
    }

    /// Tiny: latency rows are the "performance" side, energy rows the
    /// "power" side, efficiency is the inverse of the per-op energy.
    pub fn tiny() -> Self {
        Self {
            name: "tiny".to_string(),
            value_column: "Result".to_string(),
            parse_policy: ParsePolicy::Strict,
            aliases: Vec::new(),
            scenario_filter: None,
            strip_scenario_whitespace: false,
            performance_units: vec!["Latency in ms".to_string()],
            power_units: vec!["Energy in uJ".to_string()],
            tokens_per_sample: None,
            power_guard: PowerGuard {
                drop_embedded_urls: false,
                require_plain_numeric: true,
            },
            key: KeySpec::full(),
            derivation: Derivation::InverseLatency,
            require_system_columns: false,
        }
    }

    /// Training: kJ over time-to-train minutes, joined on submission and
    /// workload only, average watts as the derived value.
    pub fn training() -> Self {
        Self {
            name: "training".to_string(),
            value_column: "Avg. Result at System Name".to_string(),
            parse_policy: ParsePolicy::Strict,
            aliases: Vec::new(),
            scenario_filter: None,
            strip_scenario_whitespace: false,
            performance_units: vec!["Latency (In minutes)".to_string()],
            power_units: vec!["kJ".to_string()],
            tokens_per_sample: None,
            power_guard: PowerGuard::default(),
            key: KeySpec::submission_and_workload(),
            derivation: Derivation::EnergyOverLatency {
                unit_scale: 1000.0,
                time_scale: 60.0,
            },
            require_system_columns: false,
        }
    }

    /// Load a pipeline spec from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let spec: PipelineSpec =
            toml::from_str(&content).map_err(|e| PipelineError::Parse(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Export the spec as a TOML string.
    pub fn to_toml_string(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Serialize(e.to_string()))
    }

    /// Save the spec to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let toml_str = self.to_toml_string()?;
        std::fs::write(path.as_ref(), toml_str).map_err(PipelineError::Io)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.name.is_empty() {
            return Err(PipelineError::Validation(
                "pipeline name must not be empty".to_string(),
            ));
        }
        if self.value_column.is_empty() {
            return Err(PipelineError::Validation(
                "value column must not be empty".to_string(),
            ));
        }
        if self.performance_units.is_empty() || self.power_units.is_empty() {
            return Err(PipelineError::Validation(
                "both unit vocabularies must be non-empty".to_string(),
            ));
        }
        if let Some(tps) = self.tokens_per_sample {
            if tps <= 0.0 {
                return Err(PipelineError::Validation(format!(
                    "tokens_per_sample must be positive, got {tps}"
                )));
            }
        }
        if let Derivation::EnergyOverLatency {
            unit_scale,
            time_scale,
        } = self.derivation
        {
            if unit_scale <= 0.0 || time_scale <= 0.0 {
                return Err(PipelineError::Validation(format!(
                    "energy-over-latency scales must be positive, got {unit_scale}/{time_scale}"
                )));
            }
        }
        if self.key.version_as_ordinal && !self.key.version {
            return Err(PipelineError::Validation(
                "version_as_ordinal requires version in the join key".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_specs_validate() {
        for spec in [
            PipelineSpec::datacenter_inference(),
            PipelineSpec::edge_inference(),
            PipelineSpec::tiny(),
            PipelineSpec::training(),
        ] {
            assert!(spec.validate().is_ok(), "{} should validate", spec.name);
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let spec = PipelineSpec::datacenter_inference();
        let toml_str = spec.to_toml_string().unwrap();
        let parsed: PipelineSpec = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.name, spec.name);
        assert_eq!(parsed.performance_units, spec.performance_units);
        assert_eq!(parsed.derivation, spec.derivation);
        assert_eq!(parsed.tokens_per_sample, spec.tokens_per_sample);
    }

    #[test]
    fn test_ordinal_key_requires_version() {
        let mut spec = PipelineSpec::datacenter_inference();
        spec.key.version = false;
        spec.key.version_as_ordinal = true;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_negative_token_scale_rejected() {
        let mut spec = PipelineSpec::datacenter_inference();
        spec.tokens_per_sample = Some(-1.0);
        assert!(spec.validate().is_err());
    }
}
