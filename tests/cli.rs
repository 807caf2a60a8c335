mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;

use common::TestWorkspace;

fn impact_series() -> Command {
    Command::cargo_bin("impact-series").expect("binary exists")
}

#[test]
fn probe_lists_column_roles_and_range() {
    let workspace = TestWorkspace::new();
    let input = workspace.write(
        "upload.csv",
        "store;order_date;orders\nnorth;Jan 03 2024;4\nsouth;Jan 01 2024;\n",
    );
    impact_series()
        .args([
            "probe",
            "-i",
            input.to_str().unwrap(),
            "--delimiter",
            ";",
            "--convert-dates",
        ])
        .assert()
        .success()
        .stdout(contains("order_date  date"))
        .stdout(contains("orders      numeric"))
        .stdout(contains("store       categorical"))
        .stdout(contains("date range: 2024-01-01 to 2024-01-03"));
}

#[test]
fn probe_rejects_upload_without_date_column() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("upload.csv", "store,orders\nnorth,4\n");
    impact_series()
        .args(["probe", "-i", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("'date' column not found"));
}

#[test]
fn probe_reads_stdin() {
    impact_series()
        .args(["probe", "-i", "-"])
        .write_stdin("date,orders\n2024-02-01,1\n2024-02-05,2\n")
        .assert()
        .success()
        .stdout(contains("date range: 2024-02-01 to 2024-02-05"));
}

#[test]
fn report_writes_csv_with_target_first() {
    let workspace = TestWorkspace::new();
    let request = workspace.write_full_report();
    let output = workspace.path().join("series.csv");
    impact_series()
        .args([
            "report",
            "-r",
            request.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success();

    let contents = fs::read_to_string(&output).expect("read output");
    let mut lines = contents.lines();
    let header = lines.next().expect("header");
    assert!(header.starts_with("date,csv_orders,gads_clicks,gads_ctr"));
    assert!(header.ends_with("bq_revenue"));
    assert!(lines.next().expect("first row").starts_with("2024-01-01,4,20,0.05,15,0"));
    assert_eq!(contents.lines().count(), 6);
}

#[test]
fn report_json_carries_periods() {
    let workspace = TestWorkspace::new();
    let request = workspace.write_full_report();
    let assert = impact_series()
        .args(["report", "-r", request.to_str().unwrap(), "--format", "json"])
        .assert()
        .success();
    let value: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("parse json");
    assert_eq!(value["index"][0], "2024-01-01");
    assert_eq!(value["columns"][0], "csv_orders");
    assert_eq!(value["data"][2][0], 1200.0);
    assert_eq!(value["has_filled_gaps"], true);
    assert_eq!(value["pre_period"], serde_json::json!([0, 2]));
    assert_eq!(value["post_period"], serde_json::json!([3, 4]));
}

#[test]
fn report_table_and_summary_render_to_stdout() {
    let workspace = TestWorkspace::new();
    let request = workspace.write_full_report();
    impact_series()
        .args(["report", "-r", request.to_str().unwrap(), "--table", "--summary"])
        .assert()
        .success()
        .stdout(contains("2024-01-05"))
        .stdout(contains("column"))
        .stdout(contains("75%"))
        .stdout(contains("ga4_sessions"));
}

#[test]
fn report_with_unknown_target_fails() {
    let workspace = TestWorkspace::new();
    workspace.write("orders.csv", "date,orders\n2024-01-01,3\n");
    let request = workspace.write(
        "request.yaml",
        "from_date: 2024-01-01\nto_date: 2024-01-03\nevent_date: 2024-01-02\ntarget_event: ga4_sessions\nsources:\n  csv:\n    path: orders.csv\n    metrics: [orders]\n",
    );
    impact_series()
        .args(["report", "-r", request.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("target metric 'ga4_sessions' is not present"));
}
