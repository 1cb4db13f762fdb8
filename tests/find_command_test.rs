use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn find_requires_a_pattern() {
    let mut cmd = cargo_bin_cmd!("ssgrep");
    cmd.arg("find")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<PATTERN>"));
}

#[test]
fn table_scope_conflicts_with_all_databases() {
    let mut cmd = cargo_bin_cmd!("ssgrep");
    cmd.args(["find", "x", "--table", "dbo.Orders", "--all-databases"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn include_system_requires_all_databases() {
    let mut cmd = cargo_bin_cmd!("ssgrep");
    cmd.args(["find", "x", "--include-system"])
        .assert()
        .failure();
}

#[test]
fn schema_flag_requires_a_table() {
    let mut cmd = cargo_bin_cmd!("ssgrep");
    cmd.args(["find", "x", "--schema", "sales"])
        .assert()
        .failure();
}

#[test]
fn invalid_table_name_fails_before_connecting() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("ssgrep");
    // A control character can never be a real catalog name; the rejection
    // happens during scope resolution, so no server is needed.
    cmd.args(["find", "x", "--table", "bad\u{7}name", "--json"])
        .current_dir(temp_dir.path())
        .env_remove("SSGREP_CONFIG")
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidIdentifier"));
}

#[test]
fn connection_failure_reports_connection_error() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("ssgrep");
    cmd.args([
        "find",
        "needle",
        "--server",
        "127.0.0.1",
        "--port",
        "1",
        "--timeout",
        "1000",
        "--json",
    ])
    .current_dir(temp_dir.path())
    .env_remove("SSGREP_CONFIG")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Connection"));
}

#[test]
fn objects_rejects_unknown_type() {
    let mut cmd = cargo_bin_cmd!("ssgrep");
    cmd.args(["objects", "x", "--type", "sequence"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
