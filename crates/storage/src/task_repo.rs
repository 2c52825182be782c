// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task CRUD, claiming, listing, and redirect — §4.4.

use crate::{FileLock, Store, StoreError};
use codes_core::{Clock, Priority, Task, TaskError, TaskStatus};
use std::fs;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskRepoError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub struct TaskRepo<'a> {
    store: &'a Store,
}

impl<'a> TaskRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Allocates the next id for `team` and writes a new task. Does not
    /// take the per-task lock — nothing else can be racing an id that
    /// doesn't exist on disk yet.
    pub fn create(
        &self,
        team: &str,
        subject: &str,
        owner: &str,
        clock: &dyn Clock,
    ) -> Result<Task, TaskRepoError> {
        fs::create_dir_all(self.store.tasks_dir(team))?;
        let id = self.store.next_task_id(team)?;
        let task = Task::new(id, subject, owner, clock.now());
        Store::write(&self.store.task_path(team, id), &task)?;
        Ok(task)
    }

    pub fn get(&self, team: &str, id: u64) -> Result<Task, TaskRepoError> {
        Store::read(&self.store.task_path(team, id)).map_err(Into::into)
    }

    /// The update primitive: lock, read, mutate, stamp, write, unlock —
    /// §4.4's "Update primitive". `mutator` may fail, in which case
    /// nothing is written and the lock is still released on return.
    pub fn update<F>(&self, team: &str, id: u64, mutator: F) -> Result<Task, TaskRepoError>
    where
        F: FnOnce(&mut Task) -> Result<(), TaskError>,
    {
        fs::create_dir_all(self.store.tasks_dir(team))?;
        let _lock = FileLock::acquire(self.store.task_lock_path(team, id))?;
        let mut task = self.get(team, id)?;
        mutator(&mut task)?;
        Store::write(&self.store.task_path(team, id), &task)?;
        Ok(task)
    }

    pub fn assign(&self, team: &str, id: u64, owner: &str, clock: &dyn Clock) -> Result<Task, TaskRepoError> {
        let now = clock.now();
        self.update(team, id, move |t| t.assign(owner, now))
    }

    pub fn start(&self, team: &str, id: u64, clock: &dyn Clock) -> Result<Task, TaskRepoError> {
        let now = clock.now();
        self.update(team, id, move |t| t.start(now))
    }

    pub fn complete(&self, team: &str, id: u64, result: &str, clock: &dyn Clock) -> Result<Task, TaskRepoError> {
        let now = clock.now();
        let result = result.to_string();
        self.update(team, id, move |t| t.complete(result, now))
    }

    pub fn fail(&self, team: &str, id: u64, error: &str, clock: &dyn Clock) -> Result<Task, TaskRepoError> {
        let now = clock.now();
        let error = error.to_string();
        self.update(team, id, move |t| t.fail(error, now))
    }

    pub fn cancel(&self, team: &str, id: u64, clock: &dyn Clock) -> Result<Task, TaskRepoError> {
        let now = clock.now();
        self.update(team, id, move |t| t.cancel(now))
    }

    /// True iff any of `task`'s dependencies is missing or not yet
    /// `Completed`. A missing dependency counts as blocked, matching
    /// `Task::is_blocked`'s documented contract.
    pub fn is_blocked(&self, team: &str, task: &Task) -> bool {
        task.is_blocked(|dep_id| self.get(team, dep_id).ok().map(|t| t.status))
    }

    /// Reads every `^\d+\.json$` file in `tasks_dir(team)` (ignoring
    /// `.lock`/`.tmp` siblings), applies the filters, then orders by
    /// priority rank ascending, id ascending as tiebreak.
    pub fn list(
        &self,
        team: &str,
        status_filter: Option<TaskStatus>,
        owner_filter: Option<&str>,
    ) -> Result<Vec<Task>, TaskRepoError> {
        let dir = self.store.tasks_dir(team);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut tasks = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if !file_name.ends_with(".json") || !file_name.strip_suffix(".json").is_some_and(|s| s.parse::<u64>().is_ok())
            {
                continue;
            }
            let task: Task = Store::read(&entry.path())?;
            if let Some(status) = status_filter {
                if task.status != status {
                    continue;
                }
            }
            if let Some(owner) = owner_filter {
                if task.owner != owner {
                    continue;
                }
            }
            tasks.push(task);
        }

        tasks.sort_by(|a, b| a.priority.rank().cmp(&b.priority.rank()).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    /// Cancels `id` and creates a new task inheriting owner, project,
    /// work_dir, and priority; subject/description may be overridden.
    /// Refused only when `id` is already *completed* (§4.4, §9 note ii).
    pub fn redirect(
        &self,
        team: &str,
        id: u64,
        new_subject: Option<&str>,
        new_description: Option<&str>,
        clock: &dyn Clock,
    ) -> Result<Task, TaskRepoError> {
        let original = self.get(team, id)?;
        if original.status == TaskStatus::Completed {
            return Err(TaskRepoError::Task(TaskError::IllegalTransition {
                from: TaskStatus::Completed,
                to: TaskStatus::Cancelled,
            }));
        }

        let cancelled = self.cancel(team, id, clock)?;

        fs::create_dir_all(self.store.tasks_dir(team))?;
        let new_id = self.store.next_task_id(team)?;
        let mut replacement = Task::new(
            new_id,
            new_subject.unwrap_or(&cancelled.subject),
            &cancelled.owner,
            clock.now(),
        );
        replacement.description = new_description
            .map(str::to_string)
            .or_else(|| cancelled.description.clone());
        replacement.project = cancelled.project.clone();
        replacement.work_dir = cancelled.work_dir.clone();
        replacement.priority = cancelled.priority;
        Store::write(&self.store.task_path(team, new_id), &replacement)?;
        Ok(replacement)
    }
}

#[cfg(test)]
#[path = "task_repo_tests.rs"]
mod tests;
