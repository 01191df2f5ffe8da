//! Integration tests for the `agenda` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the check,
//! conflicts, share and view subcommands through the actual binary.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn agenda() -> Command {
    Command::cargo_bin("agenda").unwrap()
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_ready_program() {
    let output = agenda()
        .args(["check", "-i", fixture("ready.json").as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({"ready": true, "reasons": []})
    );
}

#[test]
fn check_lists_every_reason() {
    let output = agenda()
        .args(["check", "-i", fixture("unready.json").as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "ready": false,
            "reasons": [
                {"code": "missing_title"},
                {"code": "missing_date"},
                {"code": "conflicting_items", "first": 1, "second": 2}
            ]
        })
    );
}

#[test]
fn check_reads_stdin() {
    let input = std::fs::read_to_string(fixture("ready.json")).unwrap();

    agenda()
        .arg("check")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ready\": true"));
}

#[test]
fn check_rejects_malformed_document() {
    agenda()
        .arg("check")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse program document"));
}

#[test]
fn check_missing_file_fails() {
    agenda()
        .args(["check", "-i", "/nonexistent/program.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// conflicts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn conflicts_reports_both_neighbours() {
    agenda()
        .args([
            "conflicts",
            "-i",
            fixture("ready.json").as_str(),
            "--start",
            "2026-03-01T09:30:00Z",
            "--end",
            "2026-03-01T10:30:00Z",
        ])
        .assert()
        .success()
        .stdout("[1,2]\n");
}

#[test]
fn conflicts_allows_adjacent_slot() {
    agenda()
        .args([
            "conflicts",
            "-i",
            fixture("ready.json").as_str(),
            "--start",
            "2026-03-01T11:00:00Z",
            "--end",
            "2026-03-01T12:00:00Z",
        ])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn conflicts_excludes_item_being_moved() {
    agenda()
        .args([
            "conflicts",
            "-i",
            fixture("ready.json").as_str(),
            "--start",
            "2026-03-01T09:15:00Z",
            "--end",
            "2026-03-01T10:15:00Z",
            "--exclude",
            "1",
        ])
        .assert()
        .success()
        .stdout("[2]\n");
}

#[test]
fn conflicts_rejects_inverted_range() {
    agenda()
        .args([
            "conflicts",
            "-i",
            fixture("ready.json").as_str(),
            "--start",
            "2026-03-01T12:00:00Z",
            "--end",
            "2026-03-01T11:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time range"));
}

// ─────────────────────────────────────────────────────────────────────────────
// share
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn share_ready_program_mints_token() {
    let output = agenda()
        .args(["share", "-i", fixture("ready.json").as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(doc["schedule"]["share"]["state"], "shared");
    assert_eq!(doc["schedule"]["share"]["token"].as_str().unwrap().len(), 43);
    assert!(doc["schedule"]["share"]["shared_at"].is_string());
    assert_eq!(doc["items"].as_array().unwrap().len(), 2);
}

#[test]
fn share_unready_program_fails_with_reasons() {
    agenda()
        .args(["share", "-i", fixture("unready.json").as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not ready to be shared"))
        .stderr(predicate::str::contains("title is missing"))
        .stderr(predicate::str::contains("items 1 and 2 overlap"));
}

#[test]
fn share_already_shared_program_keeps_token() {
    let output = agenda()
        .args(["share", "-i", fixture("shared.json").as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let doc = stdout_json(&output);
    assert_eq!(
        doc["schedule"]["share"]["token"],
        "q2X9wB8fJ0yTn4kLm7pRs1vZc6dHa3eGu5iOx8tYw0E"
    );
    assert_eq!(doc["schedule"]["share"]["shared_at"], "2026-04-01T12:00:00Z");
}

#[test]
fn share_output_is_idempotent_when_fed_back() {
    let dir = std::env::temp_dir().join(format!("agenda-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let first = dir.join("first.json");
    let second = dir.join("second.json");

    agenda()
        .args(["share", "-i", fixture("ready.json").as_str(), "-o"])
        .arg(&first)
        .assert()
        .success();
    agenda()
        .args(["share", "-i"])
        .arg(&first)
        .arg("-o")
        .arg(&second)
        .assert()
        .success();

    let a: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&first).unwrap()).unwrap();
    let b: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&second).unwrap()).unwrap();
    assert_eq!(a["schedule"]["share"], b["schedule"]["share"]);

    std::fs::remove_dir_all(&dir).ok();
}

// ─────────────────────────────────────────────────────────────────────────────
// view
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn view_unshared_program_is_not_found() {
    agenda()
        .args(["view", "-i", fixture("ready.json").as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));
}

#[test]
fn view_shared_program_surfaces_warnings() {
    let output = agenda()
        .args(["view", "-i", fixture("shared.json").as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let view = stdout_json(&output);
    assert_eq!(view["title"], "Community Meetup");
    assert_eq!(view["item_count"], 0);
    assert_eq!(view["warnings"], serde_json::json!([{"code": "no_items"}]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn debug_logging_goes_to_stderr_only() {
    let output = agenda()
        .args(["--log-level", "debug", "check", "-i", fixture("ready.json").as_str()])
        .output()
        .unwrap();

    assert!(output.status.success());
    // stdout stays parseable JSON
    stdout_json(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("evaluated readiness"));
}

#[test]
fn invalid_log_filter_fails() {
    agenda()
        .args(["--log-level", "agenda_engine=notalevel", "check"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log filter"));
}
