// Tests for the routelens binary's output streams

use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

const TRACE_DOCUMENT: &str = r#"{
    "target": "edge.example",
    "hops": [
        {"hop": 1, "host": "r1", "lon": 8.68, "lat": 50.11, "geo_precision": "city"},
        {"hop": 2, "host": "r2", "lon": 4.9, "lat": 52.37, "geo_precision": "city"}
    ]
}"#;

fn routelens(config_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_routelens"));
    cmd.env("NO_COLOR", "1")
        .args(["render", "--config"])
        .arg(config_dir.join("absent.json"));
    cmd
}

// ============================================================================
// Render Output Tests
// ============================================================================

#[test]
fn test_render_json_stdout_is_only_the_report() {
    let temp_dir = TempDir::new().unwrap();
    let trace = temp_dir.path().join("trace.json");
    std::fs::write(&trace, TRACE_DOCUMENT).unwrap();

    let assert = routelens(temp_dir.path())
        .args(["--format", "json", "--trace"])
        .arg(&trace)
        .assert()
        .success();
    let output = assert.get_output();

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["report"]["target"], "edge.example");
    assert_eq!(parsed["report"]["view"]["segments"].as_array().unwrap().len(), 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("network path quality console"));
}

#[test]
fn test_render_with_malformed_mtr_report_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let mtr = temp_dir.path().join("mtr.json");
    std::fs::write(&mtr, "{\"report\": 5}").unwrap();

    let assert = routelens(temp_dir.path())
        .args(["--format", "json", "--target", "edge.example", "--mtr"])
        .arg(&mtr)
        .assert()
        .success();

    let parsed: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(parsed["report"]["target"], "edge.example");
    assert!(parsed["report"]["view"]["points"].as_array().unwrap().is_empty());
}
