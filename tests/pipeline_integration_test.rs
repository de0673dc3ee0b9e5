// tests/pipeline_integration_test.rs
//! End-to-end tests of the load -> classify -> join -> normalize pipeline
//! against small synthetic results tables.

use mlperf_efficiency::classify;
use mlperf_efficiency::join;
use mlperf_efficiency::pipeline::PipelineSpec;
use mlperf_efficiency::table::{self, TableError, WorkloadMatch};
use mlperf_efficiency::trend;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const DATACENTER_CSV: &str = "\
Public ID,Model MLC,Scenario,version,date,Units,Result
1.0-01,ResNet,Offline,v1.0,2021-06-30,Samples/s,\"1,000\"
1.0-01,ResNet,Offline,v1.0,2021-06-30,Watts,100
2.0-01,ResNet,Offline,v2.0,2021-12-01,Samples/s,1800
2.0-01,ResNet,Offline,v2.0,2021-12-01,Watts,100
3.0-01,ResNet,Offline,v3.0,2022-11-09,Samples/s,1500
3.0-01,ResNet,Offline,v3.0,2022-11-09,Watts,100
3.0-01,ResNet,Server,v3.0,2022-11-09,Samples/s,9999
1.0-02,GPTJ-99.0,Offline,v1.0,2021-06-30,Tokens/s,2920
1.0-02,GPTJ-99.0,Offline,v1.0,2021-06-30,Watts,10
";

#[test]
fn test_datacenter_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "datacenter.csv", DATACENTER_CSV);

    let spec = PipelineSpec::datacenter_inference();
    let records = table::load_records(&path, &spec).unwrap();
    // The Server row is gone already; 8 of the 9 rows survive the filter.
    assert_eq!(records.len(), 8);

    let records = table::retain_workloads(records, &["resnet"], WorkloadMatch::Substring);
    let partition = classify::partition(records, &spec).unwrap();
    let joined = join::join_and_derive(&partition, &spec);
    assert_eq!(joined.len(), 3);

    let refs: Vec<_> = joined.iter().collect();
    let points = trend::category_points(&refs);
    let normalized = trend::normalize_trend(&points).unwrap();

    // Raw efficiencies are 10, 18, 15; the ratchet holds v3.0 at v2.0's
    // level and everything is rescaled to the first round.
    let values: Vec<f64> = normalized.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![1.0, 1.8, 1.8]);
}

#[test]
fn test_token_rates_rescaled_before_derivation() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "datacenter.csv", DATACENTER_CSV);

    let spec = PipelineSpec::datacenter_inference();
    let records = table::load_records(&path, &spec).unwrap();
    let records = table::retain_workloads(records, &["gptj-99.0"], WorkloadMatch::Substring);
    let partition = classify::partition(records, &spec).unwrap();
    let joined = join::join_and_derive(&partition, &spec);

    // 2920 Tokens/s over 292 tokens per sample is 10 Samples/s.
    assert_eq!(joined.len(), 1);
    assert!((joined[0].performance - 10.0).abs() < 1e-12);
    assert!((joined[0].efficiency - 1.0).abs() < 1e-12);
}

#[test]
fn test_strict_pipeline_rejects_malformed_results() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "edge.csv",
        "\
Public ID,Model MLC,Scenario,version,date,Units,Result
1.1-01,resnet,Offline,v1.1,2021-06-30,Samples/s,n/a
",
    );

    let spec = PipelineSpec::edge_inference();
    let records = table::load_records(&path, &spec).unwrap();
    assert!(classify::partition(records, &spec).is_err());
}

#[test]
fn test_edge_power_rows_with_urls_are_dropped() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "edge.csv",
        "\
Public ID,Model MLC,Scenario,version,date,Units,Result
1.1-01,resnet,Offline,v1.1,2021-06-30,Samples/s,500
1.1-01,resnet,Offline,v1.1,2021-06-30,Watts,https://results.example/run1
",
    );

    let spec = PipelineSpec::edge_inference();
    let records = table::load_records(&path, &spec).unwrap();
    let partition = classify::partition(records, &spec).unwrap();
    assert_eq!(partition.performance.len(), 1);
    assert!(partition.power.is_empty());
    assert!(join::join_and_derive(&partition, &spec).is_empty());
}

#[test]
fn test_tiny_pipeline_guards_and_inverse_derivation() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "tiny.csv",
        "\
Public ID,Model MLC,Scenario,version,date,Units,Result
1.2-01,DSCNN,SingleStream,v1.2,2023-06-28,Latency in ms,2.0
1.2-01,DSCNN,SingleStream,v1.2,2023-06-28,Energy in uJ,4.0
1.2-02,DSCNN,SingleStream,v1.2,2023-06-28,Latency in ms,3.0
1.2-02,DSCNN,SingleStream,v1.2,2023-06-28,Energy in uJ,\"1,856\"
",
    );

    let spec = PipelineSpec::tiny();
    let records = table::load_records(&path, &spec).unwrap();
    let partition = classify::partition(records, &spec).unwrap();
    // The quoted thousands-separator energy fails the plain-numeric guard.
    assert_eq!(partition.power.len(), 1);

    let joined = join::join_and_derive(&partition, &spec);
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].efficiency, 0.25);
}

#[test]
fn test_training_joins_on_submission_and_workload_only() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "training.csv",
        "\
Public ID,Model MLC,Units,Avg. Result at System Name
4.0-01,bert,Latency (In minutes),5.488
4.0-01,bert,kJ,15.08
",
    );

    let spec = PipelineSpec::training();
    let records = table::load_records(&path, &spec).unwrap();
    let partition = classify::partition(records, &spec).unwrap();
    let joined = join::join_and_derive(&partition, &spec);

    assert_eq!(joined.len(), 1);
    let watts = 15.08 * 1000.0 / (60.0 * 5.488);
    assert!((joined[0].efficiency - watts).abs() < 1e-9);
}

#[test]
fn test_missing_key_column_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "no_date.csv",
        "\
Public ID,Model MLC,Scenario,version,Units,Result
1.0-01,resnet,Offline,v1.0,Samples/s,1000
",
    );

    let spec = PipelineSpec::datacenter_inference();
    let result = table::load_records(&path, &spec);
    assert!(matches!(result, Err(TableError::MissingColumn(c)) if c == "date"));
}

#[test]
fn test_wide_table_series_skips_blank_rounds() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "data_performance.csv",
        "\
Benchmark,06/30/2021,12/01/2021,11/09/2022
ResNet,1,2.1,4.5
GPT-J,,1,1.9
",
    );

    let table = table::load_wide_table(&path).unwrap();
    assert_eq!(table.dates.len(), 3);

    let resnet = table.series("ResNet").unwrap();
    assert_eq!(resnet.len(), 3);
    assert_eq!(resnet[1].1, 2.1);

    let gptj = table.series("GPT-J").unwrap();
    assert_eq!(gptj.len(), 2);
    assert!(table.series("DLRM").is_none());
}

#[test]
fn test_trend_is_insensitive_to_row_order() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "datacenter.csv", DATACENTER_CSV);

    let spec = PipelineSpec::datacenter_inference();
    let records = table::load_records(&path, &spec).unwrap();
    let records = table::retain_workloads(records, &["resnet"], WorkloadMatch::Substring);
    let partition = classify::partition(records, &spec).unwrap();
    let mut joined = join::join_and_derive(&partition, &spec);

    let refs: Vec<_> = joined.iter().collect();
    let forward = trend::normalize_trend(&trend::category_points(&refs)).unwrap();

    joined.reverse();
    let refs: Vec<_> = joined.iter().collect();
    let reversed = trend::normalize_trend(&trend::category_points(&refs)).unwrap();

    assert_eq!(forward, reversed);
}
