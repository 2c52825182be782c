// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(0, 0).unwrap()
}

#[test]
fn new_with_empty_owner_is_pending() {
    let t = Task::new(1, "echo hi", "", epoch());
    assert_eq!(t.status, TaskStatus::Pending);
}

#[test]
fn new_with_owner_is_assigned() {
    let t = Task::new(1, "echo hi", "w", epoch());
    assert_eq!(t.status, TaskStatus::Assigned);
}

#[parameterized(
    pending_to_assigned = { TaskStatus::Pending, TaskStatus::Assigned, true },
    pending_to_running = { TaskStatus::Pending, TaskStatus::Running, false },
    assigned_to_running = { TaskStatus::Assigned, TaskStatus::Running, true },
    assigned_to_completed = { TaskStatus::Assigned, TaskStatus::Completed, true },
    running_to_completed = { TaskStatus::Running, TaskStatus::Completed, true },
    running_to_failed = { TaskStatus::Running, TaskStatus::Failed, true },
    running_to_cancelled = { TaskStatus::Running, TaskStatus::Cancelled, true },
    completed_to_anything = { TaskStatus::Completed, TaskStatus::Running, false },
    cancelled_to_anything = { TaskStatus::Cancelled, TaskStatus::Running, false },
    failed_to_anything = { TaskStatus::Failed, TaskStatus::Running, false },
)]
fn transition_legality_matches_state_machine(from: TaskStatus, to: TaskStatus, expect_legal: bool) {
    assert_eq!(from.can_transition_to(to), expect_legal);
}

#[parameterized(
    completed = { TaskStatus::Completed },
    failed = { TaskStatus::Failed },
    cancelled = { TaskStatus::Cancelled },
)]
fn terminal_statuses_refuse_cancel(status: TaskStatus) {
    let mut t = Task::new(1, "x", "w", epoch());
    t.status = status;
    assert!(matches!(t.cancel(epoch()), Err(TaskError::IllegalTransition { .. })));
}

#[test]
fn cancel_from_pending_succeeds() {
    let mut t = Task::new(1, "x", "", epoch());
    t.cancel(epoch()).unwrap();
    assert_eq!(t.status, TaskStatus::Cancelled);
}

#[test]
fn assign_sets_owner_and_status() {
    let mut t = Task::new(1, "x", "", epoch());
    t.assign("w", epoch()).unwrap();
    assert_eq!(t.status, TaskStatus::Assigned);
    assert_eq!(t.owner, "w");
}

#[test]
fn assign_requires_pending() {
    let mut t = Task::new(1, "x", "w", epoch());
    assert!(t.assign("w2", epoch()).is_err());
}

#[test]
fn start_stamps_started_at() {
    let mut t = Task::new(1, "x", "w", epoch());
    t.start(epoch()).unwrap();
    assert_eq!(t.status, TaskStatus::Running);
    assert!(t.started_at.is_some());
}

#[test]
fn complete_stores_result_and_completed_at() {
    let mut t = Task::new(1, "x", "w", epoch());
    t.start(epoch()).unwrap();
    t.complete("hi", epoch()).unwrap();
    assert_eq!(t.result, "hi");
    assert!(t.completed_at.is_some());
}

#[test]
fn fail_stores_error_and_completed_at() {
    let mut t = Task::new(1, "x", "w", epoch());
    t.start(epoch()).unwrap();
    t.fail("boom", epoch()).unwrap();
    assert_eq!(t.error, "boom");
    assert!(t.completed_at.is_some());
}

#[test]
fn is_blocked_true_when_dependency_incomplete() {
    let mut t = Task::new(2, "x", "", epoch());
    t.blocked_by = vec![1];
    assert!(t.is_blocked(|_| Some(TaskStatus::Running)));
}

#[test]
fn is_blocked_false_when_all_dependencies_completed() {
    let mut t = Task::new(2, "x", "", epoch());
    t.blocked_by = vec![1];
    assert!(!t.is_blocked(|_| Some(TaskStatus::Completed)));
}

#[test]
fn is_blocked_true_when_dependency_missing() {
    let mut t = Task::new(2, "x", "", epoch());
    t.blocked_by = vec![999];
    assert!(t.is_blocked(|_| None));
}

#[test]
fn is_blocked_false_with_no_dependencies() {
    let t = Task::new(1, "x", "", epoch());
    assert!(!t.is_blocked(|_| None));
}

#[test]
fn priority_rank_orders_high_normal_low() {
    assert!(Priority::High.rank() < Priority::Normal.rank());
    assert!(Priority::Normal.rank() < Priority::Low.rank());
}

#[test]
fn priority_default_is_normal() {
    assert_eq!(Priority::default(), Priority::Normal);
}

#[test]
fn task_json_round_trips() {
    let mut t = Task::new(1, "echo hi", "w", epoch());
    t.start(epoch()).unwrap();
    let json = serde_json::to_string(&t).unwrap();
    let back: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(back.id, t.id);
    assert_eq!(back.status, t.status);
    assert_eq!(back.owner, t.owner);
}
