//! Subprocess tests for the `wiegate` binary.
//!
//! Each test works on its own database in a temporary directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn wiegate_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wiegate"))
}

fn wiegate(db: &Path, args: &[&str]) -> Output {
    Command::new(wiegate_bin())
        .arg("--database")
        .arg(db)
        .arg("--log-level")
        .arg("warn")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to run wiegate: {e}"))
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "wiegate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_user_administration_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("gate.db");

    stdout(&wiegate(&db, &["users", "add", "b4", "Alice"]));
    stdout(&wiegate(&db, &["users", "add", "0A", "Bob"]));

    let duplicate = wiegate(&db, &["users", "add", "B4", "Again"]);
    assert!(!duplicate.status.success());

    let listed = stdout(&wiegate(&db, &["users", "list"]));
    assert_eq!(listed, "B4\tAlice\n0A\tBob\n");

    stdout(&wiegate(&db, &["users", "remove", "B4"]));
    let listed = stdout(&wiegate(&db, &["users", "list"]));
    assert_eq!(listed, "0A\tBob\n");
}

#[test]
fn test_simulated_reads_are_decided_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("gate.db");
    stdout(&wiegate(&db, &["users", "add", "B4", "Alice"]));

    let out = stdout(&wiegate(&db, &["simulate", "10110100", "00001010"]));
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "B4\tgranted\tAlice");
    assert_eq!(lines[1], "0A\tdenied");
    assert_eq!(lines[2], r#"{"last_uid":"0A","len":1}"#);

    let logs = stdout(&wiegate(&db, &["logs"]));
    let entries: Vec<_> = logs.lines().collect();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].ends_with("\tB4"));
}

#[test]
fn test_settings_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("gate.db");

    let shown = stdout(&wiegate(&db, &["settings", "show"]));
    assert!(shown.contains("wifi: not provisioned"));
    assert!(shown.contains("channel=11"));

    stdout(&wiegate(&db, &["settings", "wifi", "gatehouse", "s3cret"]));
    stdout(&wiegate(&db, &["settings", "mesh", "15", "0xBEEF"]));

    let shown = stdout(&wiegate(&db, &["settings", "show"]));
    assert!(shown.contains("ssid=gatehouse pass=<set>"));
    assert!(shown.contains("channel=15 pan_id=0xBEEF"));
    assert!(!shown.contains("s3cret"));

    assert!(!wiegate(&db, &["settings", "mesh", "30", "1"]).status.success());
}

#[test]
fn test_memory_store_starts_empty() {
    let out = Command::new(wiegate_bin())
        .args(["--memory", "--log-level", "error", "simulate", "10110100"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).starts_with("B4\tdenied"));
}
