// Integration tests for the callable-timer binary
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_lowercase_text_output() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.arg("lowercase").arg("BOO");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"boo\""))
        .stderr(predicate::str::contains("Benchmark Records"))
        .stderr(predicate::str::contains("lowercase"));
}

#[test]
fn test_json_output_has_stable_fields() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.args(["--format", "json", "--label", "lower", "lowercase", "BOO"]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record["label"], "lower");
    assert_eq!(record["args"], serde_json::json!(["BOO"]));
    assert_eq!(record["return_value"], "boo");
    for key in [
        "start_time",
        "end_time",
        "total_execution_time_in_seconds",
        "call_site_file",
        "call_site_line",
    ] {
        assert!(record.get(key).is_some(), "missing {}", key);
    }
}

#[test]
fn test_csv_output_with_repeat() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.args(["--format", "csv", "-n", "3", "sum", "1", "2", "-3"]);

    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("label,args,start_time"));
    assert!(lines[1..].iter().all(|l| l.starts_with("sum,\"[1,2,-3]\"")));
}

#[test]
fn test_call_site_off_reports_unknown() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.args(["--format", "json", "--call-site", "off", "reverse", "abc"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"call_site_line\": \"Unknown\""))
        .stdout(predicate::str::contains("\"cba\""));
}

#[test]
fn test_static_method_path_default_label() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.args(["--format", "json", "Text::uppercase", "boo"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Text_uppercase\""))
        .stdout(predicate::str::contains("\"BOO\""));
}

#[test]
fn test_invalid_label_fails() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.args(["--label", "1bad", "lowercase", "BOO"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid label `1bad`"));
}

#[test]
fn test_unknown_function_fails() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.arg("definitely_not_builtin");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unresolvable callable"));
}

#[test]
fn test_callee_error_fails() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.args(["lowercase", "42"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("expects a string"));
}

#[test]
fn test_missing_function_fails() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Must specify a FUNCTION"));
}

#[test]
fn test_list_builtins() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.arg("--list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lowercase"))
        .stdout(predicate::str::contains("sleep_ms"));
}

#[test]
fn test_repeat_zero_rejected() {
    let mut cmd = Command::cargo_bin("callable-timer").unwrap();
    cmd.args(["-n", "0", "lowercase", "A"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--repeat"));
}
