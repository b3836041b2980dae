//! Integration tests for the `correlate` subcommand
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

mod utils;

use predicates::prelude::*;
use utils::{stdout_json, write_cohort, write_toml};

#[test]
fn test_correlate_json_contract() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let parsed = stdout_json(&output);

    assert_eq!(parsed["ids"], serde_json::json!(["ENSMUSG02", "ENSMUSG03"]));
    assert_eq!(parsed["names"], serde_json::json!(["Lep", "Lepr"]));
    assert_eq!(parsed["correlations"][0].as_f64(), Some(1.0));
    assert_eq!(parsed["correlations"][1].as_f64(), Some(-1.0));
    // Reference, single-overlap and zero-overlap genes are all absent
    assert_eq!(parsed["total_count"], 2);
}

#[test]
fn test_correlate_truncates_but_reports_total() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("-d")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("--max-results")
        .arg("1");

    let parsed = stdout_json(&cmd.output().unwrap());
    assert_eq!(parsed["ids"], serde_json::json!(["ENSMUSG02"]));
    assert_eq!(parsed["total_count"], 2);
}

#[test]
fn test_correlate_text_report() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("--statistic")
        .arg("spearman");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("spearman correlation"))
        .stdout(predicate::str::contains("Showing 2 of 2"))
        .stdout(predicate::str::contains("ENSMUSG02"))
        .stdout(predicate::str::contains("Lepr"))
        .stdout(predicate::str::contains("ENSMUSG05").not());
}

#[test]
fn test_correlate_expression_against_phenotypes() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("--candidate-kind")
        .arg("phenotype");

    let parsed = stdout_json(&cmd.output().unwrap());
    // Categorical clinical.coat is never a candidate
    assert_eq!(parsed["ids"], serde_json::json!(["clinical.weight"]));
    assert_eq!(parsed["names"], serde_json::json!(["Body weight"]));
    let r = parsed["correlations"][0].as_f64().unwrap();
    assert!((r - 1.0).abs() < 1e-12);
}

#[test]
fn test_correlate_phenotype_reference() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("clinical.weight")
        .arg("--reference-kind")
        .arg("phenotype");

    let parsed = stdout_json(&cmd.output().unwrap());
    assert_eq!(
        parsed["ids"],
        serde_json::json!(["ENSMUSG01", "ENSMUSG02", "ENSMUSG03"])
    );
    assert_eq!(parsed["total_count"], 3);
}

#[test]
fn test_biweight_is_client_error() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("--statistic")
        .arg("biweight");

    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let parsed = stdout_json(&output);
    assert_eq!(parsed["class"], "client");
    assert_eq!(parsed["retryable"], false);
    assert!(parsed["error"]
        .as_str()
        .unwrap()
        .contains("unsupported correlation kind"));
}

#[test]
fn test_unknown_reference_not_found() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("correlate")
        .arg("ENSMUSG99");

    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("expression 'ENSMUSG99' not found"));
}

#[test]
fn test_categorical_reference_rejected() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("correlate")
        .arg("clinical.coat")
        .arg("--reference-kind")
        .arg("phenotype");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be correlated"));
}

#[test]
fn test_zero_max_results_rejected() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("-n")
        .arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("max_results must be a positive integer"));
}

#[test]
fn test_config_supplies_snapshot_and_defaults() {
    let data = write_cohort().unwrap();
    let config = write_toml(&format!(
        "snapshot = {:?}\ndefault_max_results = 1\nparallel = false\n",
        data.path().display().to_string()
    ))
    .unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--config")
        .arg(config.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01");

    let parsed = stdout_json(&cmd.output().unwrap());
    assert_eq!(parsed["ids"], serde_json::json!(["ENSMUSG02"]));
    assert_eq!(parsed["total_count"], 2);
}

#[test]
fn test_max_results_clamped_by_config_limit() {
    let data = write_cohort().unwrap();
    let config = write_toml("default_max_results = 1\nmax_results_limit = 1\n").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--config")
        .arg(config.path())
        .arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("-n")
        .arg("500");

    let parsed = stdout_json(&cmd.output().unwrap());
    assert_eq!(parsed["ids"].as_array().unwrap().len(), 1);
}

#[test]
fn test_generous_timeout_completes() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--data")
        .arg(data.path())
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("--timeout-ms")
        .arg("60000");

    cmd.assert().success();
}

#[test]
fn test_debug_logs_to_stderr() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.arg("--debug")
        .arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("correlation scan finished"));
    // stdout stays clean JSON
    stdout_json(&output);
}

#[test]
fn test_zero_timeout_warns_under_rust_log() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.env("RUST_LOG", "warn")
        .arg("--data")
        .arg(data.path())
        .arg("correlate")
        .arg("ENSMUSG01")
        .arg("--timeout-ms")
        .arg("0");

    cmd.assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("correlation timeout reached"))
        .stderr(predicate::str::contains("cancelled"));
}

#[test]
fn test_rust_log_info_reports_requests() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.env("RUST_LOG", "info")
        .arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("json")
        .arg("correlate")
        .arg("ENSMUSG01");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cohort loaded"));
    assert!(stderr.contains("correlate"));
    stdout_json(&output);
}

#[test]
fn test_default_log_level_is_quiet() {
    let data = write_cohort().unwrap();
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("phenocorr");
    cmd.env_remove("RUST_LOG")
        .arg("--data")
        .arg(data.path())
        .arg("correlate")
        .arg("ENSMUSG01");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("cohort loaded").not());
}
