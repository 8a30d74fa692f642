//! CLI integration tests for query interpolation.

use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::tempdir;

#[test]
fn interpolate_file_with_filter_and_variable() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("panel.sql");

    std::fs::write(
        &sql_path,
        "SELECT * FROM orders WHERE $__conditionalAll(region IN ($region), $region);\n",
    )
    .expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .args([
            "--var",
            "region=$__all",
            "--filter",
            "orders.status=shipped",
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    assert!(output.status.success(), "CLI should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout,
        "SELECT * FROM orders WHERE 1=1 settings additional_table_filters={'orders' : ' status = \\'shipped\\' '}\n"
    );
}

#[test]
fn interpolate_stdin_multi_value_variable() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .args(["--var", "host=a,b"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("run CLI");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"SELECT * FROM logs WHERE $__conditionalAll(host IN (${host:singlequote}), $host)")
        .expect("write stdin");

    let output = child.wait_with_output().expect("wait for CLI");
    assert!(output.status.success(), "CLI should succeed");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT * FROM logs WHERE host IN ('a','b')\n"
    );
}

#[test]
fn disabled_ad_hoc_filters_fail_with_exit_code() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("panel.sql");
    std::fs::write(&sql_path, "SELECT * FROM orders").expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .args([
            "--ad-hoc",
            "disabled",
            "--filter",
            "orders.id=1",
            "-f",
            "json",
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(value["hasErrors"], true);
    assert_eq!(value["issues"][0]["code"], "AD_HOC_FILTERS_DISALLOWED");
}

#[test]
fn filter_source_is_left_unfiltered() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("source.sql");
    std::fs::write(&sql_path, "SELECT DISTINCT status FROM orders").expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .args([
            "--filter-source",
            "--filter",
            "orders.status=new",
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    assert!(output.status.success(), "CLI should succeed");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT DISTINCT status FROM orders\n"
    );
}

#[test]
fn context_file_supplies_variables_and_target_table() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("panel.sql");
    let ctx_path = dir.path().join("context.json");
    std::fs::write(&sql_path, "SELECT count() FROM events WHERE $__conditionalAll(kind = '$kind', $kind)")
        .expect("write sql");
    std::fs::write(
        &ctx_path,
        r#"{
            "variables": [{"name": "kind", "current": {"value": "click"}}],
            "filters": [{"key": "country", "operator": "=", "value": "NL"}],
            "targetTableQuery": "SELECT DISTINCT country FROM events"
        }"#,
    )
    .expect("write context");

    let output = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .args([
            "--context",
            ctx_path.to_str().expect("context path"),
            "-f",
            "json",
            "--compact",
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    assert!(output.status.success(), "CLI should succeed");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["targetTable"], "events");
    assert_eq!(
        value["query"],
        r"SELECT count() FROM events WHERE kind = 'click' settings additional_table_filters={'events' : ' country = \'NL\' '}"
    );
}

#[test]
fn multiple_files_are_tagged() {
    let dir = tempdir().expect("temp dir");
    let a = dir.path().join("a.sql");
    let b = dir.path().join("b.sql");
    std::fs::write(&a, "SELECT 1").expect("write sql");
    std::fs::write(&b, "SELECT 2").expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .args([a.to_str().expect("path"), b.to_str().expect("path")])
        .output()
        .expect("run CLI");

    assert!(output.status.success(), "CLI should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SELECT 1\n\n-- "), "{stdout}");
    assert!(stdout.ends_with("b.sql\nSELECT 2\n"), "{stdout}");
}

#[test]
fn invalid_filter_is_a_config_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .args(["--filter", "status", "/nonexistent/never-read.sql"])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn malformed_macro_warns_on_stderr() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("panel.sql");
    std::fs::write(&sql_path, "SELECT $__conditionalAll(a = 1 FROM t").expect("write sql");

    let output = Command::new(env!("CARGO_BIN_EXE_querystencil"))
        .arg(sql_path.to_str().expect("sql path"))
        .output()
        .expect("run CLI");

    assert!(output.status.success(), "warnings do not fail the run");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MALFORMED_MACRO"), "{stderr}");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT $__conditionalAll(a = 1 FROM t\n"
    );
}
