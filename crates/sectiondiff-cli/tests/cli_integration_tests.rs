//! CLI integration tests
//!
//! These tests drive the built `sectiondiff` binary against snapshot files in
//! a scratch directory.

use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_snapshot(dir: &TempDir, name: &str, snapshot: Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_vec_pretty(&snapshot).unwrap()).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_sectiondiff");
    Command::new(cli_bin)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn item_path(section_index: usize, item_index: usize) -> Value {
    json!({ "section_index": section_index, "item_index": item_index })
}

fn initial() -> Value {
    json!([
        { "id": "S1", "header": "Inbox", "items": [
            { "id": "a", "value": 1 },
            { "id": "b", "value": 2 }
        ]}
    ])
}

fn updated() -> Value {
    json!([
        { "id": "S1", "header": "Inbox", "items": [
            { "id": "b", "value": 3 },
            { "id": "c", "value": 4 }
        ]}
    ])
}

#[test]
fn test_cli_diff_prints_changeset_json() {
    // GIVEN two snapshot files
    let dir = TempDir::new().unwrap();
    let from = write_snapshot(&dir, "from.json", initial());
    let to = write_snapshot(&dir, "to.json", updated());

    // WHEN `sectiondiff diff --from .. --to ..`
    let output = run(&[
        "diff",
        "--from",
        from.to_str().unwrap(),
        "--to",
        to.to_str().unwrap(),
    ]);

    // THEN the changeset is printed as JSON
    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let changeset: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(changeset["deleted_items"], json!([item_path(0, 0)]));
    assert_eq!(changeset["updated_items"], json!([item_path(0, 0)]));
    assert_eq!(changeset["inserted_items"], json!([item_path(0, 1)]));
    assert_eq!(changeset["final"], updated());
}

#[test]
fn test_cli_diff_summary_format() {
    let dir = TempDir::new().unwrap();
    let from = write_snapshot(&dir, "from.json", initial());
    let to = write_snapshot(&dir, "to.json", updated());

    let output = run(&[
        "diff",
        "--from",
        from.to_str().unwrap(),
        "--to",
        to.to_str().unwrap(),
        "--format",
        "summary",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Changeset"));
    assert!(stdout.contains("- **Updated** (1): `b` (0, 0)"));
}

#[test]
fn test_cli_diff_staged_prints_array() {
    let dir = TempDir::new().unwrap();
    let from = write_snapshot(
        &dir,
        "from.json",
        json!([
            { "id": "X", "items": [{ "id": "a", "value": 1 }] },
            { "id": "Y", "items": [] }
        ]),
    );
    let to = write_snapshot(
        &dir,
        "to.json",
        json!([
            { "id": "Y", "items": [] },
            { "id": "X", "items": [{ "id": "a", "value": 2 }] }
        ]),
    );

    let output = run(&[
        "diff",
        "--from",
        from.to_str().unwrap(),
        "--to",
        to.to_str().unwrap(),
        "--staged",
    ]);

    assert!(output.status.success());
    let stages: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0]["moved_sections"], json!([[0, 1], [1, 0]]));
    assert_eq!(stages[1]["updated_items"], json!([item_path(1, 0)]));
}

#[test]
fn test_cli_diff_duplicate_identity_fails() {
    // GIVEN a snapshot with two sections named "A"
    let dir = TempDir::new().unwrap();
    let from = write_snapshot(&dir, "from.json", json!([{ "id": "A" }]));
    let to = write_snapshot(&dir, "to.json", json!([{ "id": "A" }, { "id": "A" }]));

    // WHEN
    let output = run(&[
        "diff",
        "--from",
        from.to_str().unwrap(),
        "--to",
        to.to_str().unwrap(),
    ]);

    // THEN exit 1 with the offending identity on stderr
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Structural inconsistency"));
    assert!(stderr.contains("`A`"));
}

#[test]
fn test_cli_diff_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let from = write_snapshot(&dir, "from.json", initial());
    let missing = dir.path().join("missing.json");

    let output = run(&[
        "diff",
        "--from",
        from.to_str().unwrap(),
        "--to",
        missing.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.json"));
}

#[test]
fn test_cli_replay_binds_then_applies() {
    let dir = TempDir::new().unwrap();
    let first = write_snapshot(&dir, "1.json", initial());
    let second = write_snapshot(&dir, "2.json", updated());

    let output = run(&[
        "replay",
        first.to_str().unwrap(),
        second.to_str().unwrap(),
    ]);

    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("reload: sections=1 items=2"));
    assert!(stdout.contains("\"reason\":\"initial_bind\""));
    assert!(stdout.contains("apply: operations=3 (sections: 0, items: 3)"));
    assert!(stdout.contains("totals: reloads=1 changesets=1 errors=0"));
}

#[test]
fn test_cli_replay_fade_from_config_file() {
    // GIVEN a config enabling fades and a single-item deletion
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("coordinator.toml");
    fs::write(&config, "fade_delete_ms = 120\n").unwrap();
    let first = write_snapshot(&dir, "1.json", initial());
    let second = write_snapshot(
        &dir,
        "2.json",
        json!([{ "id": "S1", "header": "Inbox", "items": [{ "id": "b", "value": 2 }] }]),
    );

    // WHEN
    let output = run(&[
        "replay",
        "--config",
        config.to_str().unwrap(),
        first.to_str().unwrap(),
        second.to_str().unwrap(),
    ]);

    // THEN the fade is announced before the deletion is applied
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let fade = stdout.find("fade-out: item (0, 0) over 120ms").unwrap();
    let apply = stdout.find("apply: operations=1").unwrap();
    assert!(fade < apply);
    assert!(stdout.contains("fade-out complete"));
}

#[test]
fn test_cli_replay_max_ops_forces_reload() {
    let dir = TempDir::new().unwrap();
    let first = write_snapshot(&dir, "1.json", initial());
    let second = write_snapshot(&dir, "2.json", updated());

    let output = run(&[
        "replay",
        "--max-ops",
        "1",
        first.to_str().unwrap(),
        second.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"reason\":\"policy\""));
    assert!(stdout.contains("totals: reloads=2 changesets=0 errors=0"));
}

#[test]
fn test_cli_replay_reports_inconsistency_and_continues() {
    let dir = TempDir::new().unwrap();
    let first = write_snapshot(&dir, "1.json", initial());
    let bad = write_snapshot(&dir, "2.json", json!([{ "id": "A" }, { "id": "A" }]));

    let output = run(&["replay", first.to_str().unwrap(), bad.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("error: [ERR_STRUCTURAL_INCONSISTENCY]"));
    assert!(stdout.contains("\"reason\":\"structural_inconsistency\""));
    assert!(stdout.contains("totals: reloads=2 changesets=0 errors=1"));
}

#[test]
fn test_cli_replay_rejects_zero_fade() {
    let dir = TempDir::new().unwrap();
    let first = write_snapshot(&dir, "1.json", initial());

    let output = run(&["replay", "--fade-ms", "0", first.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("fade_delete_ms"));
}
