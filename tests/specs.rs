//! End-to-end scenarios driving the `codes` CLI binary directly,
//! per spec.md §8's concrete scenarios that don't require a live
//! daemon process (S1/S3/S4 need a running poll loop and a stubbed
//! adapter; those are covered at the unit level inside
//! `codes-daemon`'s `poll_tests.rs` instead).

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn codes(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("codes").expect("codes binary builds");
    cmd.env("CODES_HOME", home);
    cmd
}

fn json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json on stdout")
}

#[test]
fn s2_dependency_gating_reflects_in_blocked_by_and_status() {
    let home = TempDir::new().unwrap();

    codes(home.path()).args(["team", "create", "beta"]).assert().success();
    codes(home.path()).args(["task", "create", "beta", "step one"]).assert().success();

    let list = codes(home.path()).args(["-o", "json", "task", "list", "beta"]).output().unwrap();
    let t1_id = json(&list).as_array().unwrap()[0]["id"].as_u64().unwrap();

    codes(home.path())
        .args(["task", "create", "beta", "step two", "--depends-on", &t1_id.to_string()])
        .assert()
        .success();

    let list = codes(home.path()).args(["-o", "json", "task", "list", "beta"]).output().unwrap();
    let tasks = json(&list);
    let t2 = tasks.as_array().unwrap().iter().find(|t| t["subject"] == "step two").unwrap();
    assert_eq!(t2["blockedBy"].as_array().unwrap()[0].as_u64().unwrap(), t1_id);
    assert_eq!(t2["status"], "pending");
}

#[test]
fn s5_redirect_inherits_owner_priority_project_work_dir() {
    let home = TempDir::new().unwrap();

    codes(home.path()).args(["team", "create", "delta"]).assert().success();
    codes(home.path()).args(["agent", "add", "delta", "w"]).assert().success();
    codes(home.path())
        .args([
            "task", "create", "delta", "A", "--owner", "w", "--priority", "high", "--project", "p", "--work-dir", "/tmp",
        ])
        .assert()
        .success();

    let list = codes(home.path()).args(["-o", "json", "task", "list", "delta"]).output().unwrap();
    let original_id = json(&list).as_array().unwrap()[0]["id"].as_u64().unwrap();

    codes(home.path())
        .args(["task", "redirect", "delta", &original_id.to_string(), "--description", "B"])
        .assert()
        .success();

    let list = codes(home.path()).args(["-o", "json", "task", "list", "delta"]).output().unwrap();
    let tasks = list.stdout;
    let tasks: Value = serde_json::from_slice(&tasks).unwrap();
    let tasks = tasks.as_array().unwrap();

    let original = tasks.iter().find(|t| t["id"].as_u64().unwrap() == original_id).unwrap();
    assert_eq!(original["status"], "cancelled");

    let replacement = tasks.iter().find(|t| t["id"].as_u64().unwrap() != original_id).unwrap();
    assert_eq!(replacement["subject"], "A");
    assert_eq!(replacement["owner"], "w");
    assert_eq!(replacement["project"], "p");
    assert_eq!(replacement["workDir"], "/tmp");
    assert_eq!(replacement["status"], "assigned");
}

#[test]
fn cancel_on_an_already_terminal_task_is_refused() {
    // spec.md §8 property 7: cancel on a terminal-status task is a
    // precondition error. Cancelling twice reaches the same precondition
    // without needing a stubbed adapter run to reach `completed`.
    let home = TempDir::new().unwrap();
    codes(home.path()).args(["team", "create", "eps"]).assert().success();
    codes(home.path()).args(["task", "create", "eps", "only task"]).assert().success();

    let list = codes(home.path()).args(["-o", "json", "task", "list", "eps"]).output().unwrap();
    let id = json(&list).as_array().unwrap()[0]["id"].as_u64().unwrap();

    codes(home.path()).args(["task", "assign", "eps", &id.to_string(), "w"]).assert().success();
    codes(home.path()).args(["task", "cancel", "eps", &id.to_string()]).assert().success();
    codes(home.path()).args(["task", "cancel", "eps", &id.to_string()]).assert().failure();
}

#[test]
fn messages_addressed_to_a_member_include_broadcasts_but_not_other_recipients() {
    let home = TempDir::new().unwrap();
    codes(home.path()).args(["team", "create", "zeta"]).assert().success();

    codes(home.path()).args(["message", "broadcast", "zeta", "lead", "good morning"]).assert().success();
    codes(home.path()).args(["message", "send", "zeta", "lead", "w1", "just for you"]).assert().success();
    codes(home.path()).args(["message", "send", "zeta", "lead", "w2", "not for w1"]).assert().success();

    let out = codes(home.path()).args(["-o", "json", "message", "list", "zeta", "w1"]).output().unwrap();
    let messages = json(&out);
    let contents: Vec<String> = messages.as_array().unwrap().iter().map(|m| m["content"].as_str().unwrap().to_string()).collect();

    assert!(contents.contains(&"good morning".to_string()));
    assert!(contents.contains(&"just for you".to_string()));
    assert!(!contents.contains(&"not for w1".to_string()));
}
