//! CLI tests for the `grammar` binary.
//!
//! Spawns the binary against a temporary state directory and checks output
//! and exit codes. No test reaches a real model endpoint.

use std::path::Path;
use std::process::{Command, Output};

use grammar::exit_codes;

fn grammar(state_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_grammar"))
        .arg("--state-dir")
        .arg(state_dir)
        .args(args)
        .env_remove("GEMINI_API_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("run grammar")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn key_set_show_delete() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = temp.path().join(".grammar");

    let output = grammar(&state, &["key", "show"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout(&output), "No API key stored");

    let output = grammar(&state, &["key", "set", "abc123"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(state.join("credentials.json").exists());

    let output = grammar(&state, &["key", "show"]);
    assert_eq!(stdout(&output), "API key: ••••••••");

    let output = grammar(&state, &["key", "delete"]);
    assert_eq!(stdout(&output), "API key deleted");
    let output = grammar(&state, &["key", "delete"]);
    assert_eq!(stdout(&output), "No API key stored");
}

#[test]
fn correct_without_key_is_capability_unavailable() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = grammar(&temp.path().join(".grammar"), &["correct", "hello"]);

    assert_eq!(
        output.status.code(),
        Some(exit_codes::CAPABILITY_UNAVAILABLE)
    );
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("capability_unavailable"), "{stderr}");
}

#[test]
fn blank_text_is_invalid_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = temp.path().join(".grammar");
    grammar(&state, &["key", "set", "abc123"]);

    let output = grammar(&state, &["correct", "   "]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID_INPUT));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Input text cannot be empty"), "{stderr}");
}

#[test]
fn invalid_config_exits_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = temp.path().join(".grammar");
    std::fs::create_dir_all(&state).expect("mkdir");
    std::fs::write(state.join("config.toml"), "model = \"\"\n").expect("write config");

    let output = grammar(&state, &["translate", "vanakkam"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn usage_errors_are_distinct_from_invalid_input() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = temp.path().join(".grammar");

    let output = grammar(&state, &["summarize", "vanakkam"]);
    assert_eq!(output.status.code(), Some(exit_codes::USAGE));
    assert_ne!(exit_codes::USAGE, exit_codes::INVALID_INPUT);

    let output = grammar(&state, &["translate", "vanakkam", "--bogus"]);
    assert_eq!(output.status.code(), Some(exit_codes::USAGE));
}
