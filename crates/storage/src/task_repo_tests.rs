// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use codes_core::{FakeClock, Priority};
use tempfile::tempdir;

fn repo(store: &Store) -> TaskRepo<'_> {
    TaskRepo::new(store)
}

#[test]
fn create_assigns_sequential_ids() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let t1 = repo(&store).create("alpha", "first", "", &clock).unwrap();
    let t2 = repo(&store).create("alpha", "second", "", &clock).unwrap();
    assert_eq!(t1.id, 1);
    assert_eq!(t2.id, 2);
    assert_eq!(t1.status, TaskStatus::Pending);
}

#[test]
fn create_with_owner_is_assigned() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let t = repo(&store).create("alpha", "first", "w", &clock).unwrap();
    assert_eq!(t.status, TaskStatus::Assigned);
    assert_eq!(t.owner, "w");
}

#[test]
fn assign_start_complete_happy_path() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "x", "", &clock).unwrap();
    r.assign("alpha", 1, "w", &clock).unwrap();
    r.start("alpha", 1, &clock).unwrap();
    let done = r.complete("alpha", 1, "done", &clock).unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.result, "done");
}

#[test]
fn double_assign_is_race_loss() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "x", "", &clock).unwrap();
    r.assign("alpha", 1, "w1", &clock).unwrap();
    let err = r.assign("alpha", 1, "w2", &clock).unwrap_err();
    assert!(matches!(err, TaskRepoError::Task(TaskError::IllegalTransition { .. })));
}

#[test]
fn cancel_refused_on_completed() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "x", "w", &clock).unwrap();
    r.start("alpha", 1, &clock).unwrap();
    r.complete("alpha", 1, "ok", &clock).unwrap();
    let err = r.cancel("alpha", 1, &clock).unwrap_err();
    assert!(matches!(err, TaskRepoError::Task(TaskError::IllegalTransition { .. })));
}

#[test]
fn is_blocked_true_when_dependency_incomplete() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "dep", "w", &clock).unwrap();
    let mut t2 = r.create("alpha", "main", "w", &clock).unwrap();
    t2.blocked_by.push(1);
    Store::write(&store.task_path("alpha", t2.id), &t2).unwrap();
    let t2 = r.get("alpha", t2.id).unwrap();
    assert!(r.is_blocked("alpha", &t2));
}

#[test]
fn is_blocked_false_when_dependency_completed() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "dep", "w", &clock).unwrap();
    r.start("alpha", 1, &clock).unwrap();
    r.complete("alpha", 1, "ok", &clock).unwrap();
    let mut t2 = r.create("alpha", "main", "w", &clock).unwrap();
    t2.blocked_by.push(1);
    Store::write(&store.task_path("alpha", t2.id), &t2).unwrap();
    let t2 = r.get("alpha", t2.id).unwrap();
    assert!(!r.is_blocked("alpha", &t2));
}

#[test]
fn is_blocked_true_when_dependency_missing() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    let mut t = r.create("alpha", "main", "w", &clock).unwrap();
    t.blocked_by.push(999);
    Store::write(&store.task_path("alpha", t.id), &t).unwrap();
    let t = r.get("alpha", t.id).unwrap();
    assert!(r.is_blocked("alpha", &t));
}

#[test]
fn list_orders_by_priority_then_id() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    let mut low = r.create("alpha", "low", "w", &clock).unwrap();
    low.priority = Priority::Low;
    Store::write(&store.task_path("alpha", low.id), &low).unwrap();
    let mut high = r.create("alpha", "high", "w", &clock).unwrap();
    high.priority = Priority::High;
    Store::write(&store.task_path("alpha", high.id), &high).unwrap();
    r.create("alpha", "normal", "w", &clock).unwrap();

    let ids: Vec<_> = r.list("alpha", None, None).unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![high.id, 3, low.id]);
}

#[test]
fn list_filters_by_status_and_owner() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "a", "w1", &clock).unwrap();
    r.create("alpha", "b", "w2", &clock).unwrap();
    r.start("alpha", 1, &clock).unwrap();

    let running = r.list("alpha", Some(TaskStatus::Running), None).unwrap();
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].id, 1);

    let w2 = r.list("alpha", None, Some("w2")).unwrap();
    assert_eq!(w2.len(), 1);
    assert_eq!(w2[0].id, 2);
}

#[test]
fn list_ignores_lock_and_tmp_files() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "a", "w", &clock).unwrap();
    std::fs::write(store.task_lock_path("alpha", 1), "").unwrap();
    std::fs::write(store.tasks_dir("alpha").join("1.json.tmp"), "{}").unwrap();
    assert_eq!(r.list("alpha", None, None).unwrap().len(), 1);
}

#[test]
fn redirect_inherits_fields_and_cancels_original() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    let mut t = r.create("alpha", "A", "w", &clock).unwrap();
    t.priority = Priority::High;
    t.project = Some("p".to_string());
    t.work_dir = Some("/tmp".to_string());
    Store::write(&store.task_path("alpha", t.id), &t).unwrap();
    r.start("alpha", t.id, &clock).unwrap();

    let replacement = r.redirect("alpha", t.id, None, Some("B"), &clock).unwrap();
    assert_eq!(replacement.subject, "A");
    assert_eq!(replacement.description.as_deref(), Some("B"));
    assert_eq!(replacement.owner, "w");
    assert_eq!(replacement.priority, Priority::High);
    assert_eq!(replacement.project.as_deref(), Some("p"));
    assert_eq!(replacement.work_dir.as_deref(), Some("/tmp"));
    assert_eq!(replacement.status, TaskStatus::Assigned);

    let original = r.get("alpha", t.id).unwrap();
    assert_eq!(original.status, TaskStatus::Cancelled);
}

#[test]
fn redirect_refuses_completed_task() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let r = repo(&store);
    r.create("alpha", "A", "w", &clock).unwrap();
    r.start("alpha", 1, &clock).unwrap();
    r.complete("alpha", 1, "ok", &clock).unwrap();

    let err = r.redirect("alpha", 1, None, None, &clock).unwrap_err();
    assert!(matches!(err, TaskRepoError::Task(TaskError::IllegalTransition { .. })));
}
