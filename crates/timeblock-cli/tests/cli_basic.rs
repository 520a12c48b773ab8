//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with an isolated config directory and
//! verify JSON outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_timeblock"))
        .args(args)
        .env("TIMEBLOCK_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_blocks_drag() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["blocks", "drag", "2024-01-01T09:00:00Z", "2024-01-03T10:00:00Z"],
    );
    assert_eq!(code, 0, "drag failed: {stderr}");

    let blocks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let blocks = blocks.as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0]["date"], "2024-01-01");
    assert_eq!(blocks[1]["date"], "2024-01-02");
    assert_eq!(blocks[0]["start_time"], "09:00:00+00:00");
    assert_eq!(blocks[0]["end_time"], "10:15:00+00:00");
}

#[test]
fn test_blocks_merge() {
    let dir = tempfile::tempdir().unwrap();
    let prev = write(
        dir.path(),
        "prev.json",
        r#"[{"id":"a","date":"2024-01-01","start_time":"09:00:00Z","end_time":"10:00:00Z"}]"#,
    );
    let new = write(
        dir.path(),
        "new.json",
        r#"[{"date":"2024-01-01","start_time":"10:00:00Z","end_time":"11:00:00Z"}]"#,
    );

    let (stdout, stderr, code) = run_cli(dir.path(), &["blocks", "merge", &prev, &new]);
    assert_eq!(code, 0, "merge failed: {stderr}");

    let merged: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        merged,
        serde_json::json!([{"id":"a","date":"2024-01-01","start_time":"09:00:00Z","end_time":"11:00:00Z"}])
    );
}

#[test]
fn test_blocks_remove() {
    let dir = tempfile::tempdir().unwrap();
    let prev = write(
        dir.path(),
        "prev.json",
        r#"[{"id":"a","date":"2024-01-01","start_time":"08:00:00Z","end_time":"18:00:00Z"}]"#,
    );

    let (stdout, stderr, code) = run_cli(dir.path(), &["blocks", "remove", &prev, "2024-01-01T12:00:00Z"]);
    assert_eq!(code, 0, "remove failed: {stderr}");

    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        result,
        serde_json::json!([
            {"date":"2024-01-01","start_time":"08:00:00Z","end_time":"12:00:00Z"},
            {"date":"2024-01-01","start_time":"12:15:00Z","end_time":"18:00:00Z"}
        ])
    );
}

#[test]
fn test_blocks_rejects_bad_instant() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["blocks", "drag", "yesterday", "2024-01-03T10:00:00Z"]);
    assert_ne!(code, 0);
}

#[test]
fn test_schedule_run() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write(
        dir.path(),
        "scenario.json",
        r#"{
            "name": "Morning",
            "tasks": [
                { "id": "t", "name": "Write", "duration": 60, "minDuration": 30, "maxDuration": 60,
                  "category": "work", "deadline": "2024-01-01T09:30:00Z" }
            ],
            "activeHours": {
                "work": [ { "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T12:00:00Z" } ]
            }
        }"#,
    );

    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["schedule", "run", &scenario, "--now", "2024-01-01T00:00:00Z"],
    );
    assert_eq!(code, 0, "schedule failed: {stderr}");

    let result: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(result["events"].as_array().unwrap().len(), 1);
    assert_eq!(result["events"][0]["isPastDeadline"], true);
    assert_eq!(result["logs"][0]["type"], "warning");
}

#[test]
fn test_schedule_check_reports_invalid_task() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = write(
        dir.path(),
        "scenario.json",
        r#"{ "name": "Broken", "tasks": [
            { "id": "t", "name": "Bad", "duration": 30, "minDuration": 60, "maxDuration": 90, "category": "work" }
        ] }"#,
    );

    let (stdout, _, code) = run_cli(dir.path(), &["schedule", "check", &scenario]);
    assert_ne!(code, 0);
    assert!(stdout.contains("invalid t"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timeblocks.drag_padding_minutes", "30"]);
    assert_eq!(code, 0, "config set failed: {stderr}");

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timeblocks.drag_padding_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "30");

    let (stdout, _, _) = run_cli(
        dir.path(),
        &["blocks", "drag", "2024-01-01T09:00:00Z", "2024-01-02T10:00:00Z"],
    );
    let blocks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(blocks[0]["end_time"], "10:30:00+00:00");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "nope.missing"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}
