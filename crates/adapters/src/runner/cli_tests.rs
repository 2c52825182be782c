// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use tempfile::tempdir;

fn write_fake_binary(body: &str) -> (tempfile::TempDir, String) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fake-cli");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    let path_str = path.to_string_lossy().into_owned();
    (dir, path_str)
}

fn config(prompt: &str) -> RunConfig {
    RunConfig::new(prompt, std::env::temp_dir())
}

#[tokio::test]
async fn run_parses_successful_json_output() {
    let (_dir, bin) = write_fake_binary(
        r#"echo '{"result":"done","is_error":false,"session_id":"s1","usage":{"input_tokens":10,"output_tokens":5,"total_cost_usd":0.01}}'"#,
    );
    let runner = CliRunner::new("fake", &bin);
    assert!(runner.available());

    let result = runner.run(&config("hello")).await.unwrap();
    assert_eq!(result.result_text, "done");
    assert!(!result.is_error());
    assert_eq!(result.session_id.as_deref(), Some("s1"));
    assert_eq!(result.cost.unwrap().input_tokens, 10);
}

#[tokio::test]
async fn run_surfaces_is_error_as_error_text_not_err() {
    let (_dir, bin) = write_fake_binary(r#"echo '{"result":"","is_error":true,"error":"tool denied"}'"#);
    let runner = CliRunner::new("fake", &bin);

    let result = runner.run(&config("hello")).await.unwrap();
    assert!(result.is_error());
    assert_eq!(result.error_text, "tool denied");
}

#[tokio::test]
async fn run_nonzero_exit_without_json_becomes_error_text() {
    let (_dir, bin) = write_fake_binary("echo 'boom' >&2; exit 1");
    let runner = CliRunner::new("fake", &bin);

    let result = runner.run(&config("hello")).await.unwrap();
    assert!(result.is_error());
    assert!(result.error_text.contains("boom"));
}

#[tokio::test]
async fn unavailable_binary_fails_run() {
    let runner = CliRunner::new("ghost", "/nonexistent/binary-that-is-not-there");
    let err = runner.run(&config("hello")).await.unwrap_err();
    assert!(matches!(err, RunnerError::Unavailable(_)));
}

#[test]
fn capabilities_report_full_support() {
    let runner = CliRunner::new("fake", "/bin/true");
    let caps = runner.capabilities();
    assert!(caps.session_persistence);
    assert!(caps.structured_output);
    assert!(caps.model_selection);
    assert!(caps.cost_reporting);
}
