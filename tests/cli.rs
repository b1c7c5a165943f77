//! Integration tests for the `homefeed` binary

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn homefeed(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_homefeed"))
        .arg("--config-dir")
        .arg(config_dir)
        .args(args)
        .env_remove("HOMEFEED_TOKEN")
        // Keep log files inside the test directory on Linux
        .env("XDG_DATA_HOME", config_dir.join("data"))
        .output()
        .expect("failed to run homefeed")
}

/// Parse NDJSON stdout into events
fn events(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("invalid NDJSON line"))
        .collect()
}

#[test]
fn test_bootstrap_without_servers_needs_selection() {
    let temp = TempDir::new().unwrap();
    let output = homefeed(temp.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    let events = events(&output);
    assert_eq!(events.first().unwrap()["event"], "started");
    let last = events.last().unwrap();
    assert_eq!(last["event"], "finished");
    assert_eq!(last["status"], "needs_server_selection");
}

#[test]
fn test_bootstrap_unreachable_server_is_signed_in_error() {
    let temp = TempDir::new().unwrap();
    let added = homefeed(
        temp.path(),
        &[
            "add-server",
            "--address",
            "http://127.0.0.1:9",
            "--account-id",
            "u1",
            "--display-name",
            "Alice",
            "--token",
            "tok",
        ],
    );
    assert!(added.status.success());

    let output = homefeed(temp.path(), &["bootstrap"]);

    assert_eq!(output.status.code(), Some(2));
    let events = events(&output);
    let final_state = events
        .iter()
        .rev()
        .find(|e| e["event"] == "state_changed")
        .expect("state_changed event");
    assert_eq!(final_state["state"]["status"], "signed_in_error");
    assert_eq!(final_state["state"]["reauth"]["account_id"], "u1");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("tok\""));
}

#[test]
fn test_show_config_lists_servers() {
    let temp = TempDir::new().unwrap();
    homefeed(
        temp.path(),
        &[
            "add-server",
            "--address",
            "https://media.example.com",
            "--account-id",
            "u1",
            "--display-name",
            "Alice",
            "--server-name",
            "Home",
        ],
    );

    let output = homefeed(temp.path(), &["show-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("https://media.example.com (Home)"));
    assert!(stdout.contains("token missing"));
}

#[test]
fn test_add_server_rejects_invalid_address() {
    let temp = TempDir::new().unwrap();
    let output = homefeed(
        temp.path(),
        &[
            "add-server",
            "--address",
            "not a url",
            "--account-id",
            "u1",
            "--display-name",
            "Alice",
        ],
    );

    assert!(!output.status.success());
}
