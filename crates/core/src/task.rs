// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task identifier and state machine — §3 "Task", §4.4.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Status of a task. Transitions follow §4.4's state machine; the
/// `can_transition_to` method is the single source of truth the
/// repository's `update` mutators consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Assigned,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Terminal statuses never transition out.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// Whether `self -> next` is a legal transition per §4.4.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        match (self, next) {
            (Pending, Assigned) => true,
            (Pending, Cancelled) => true,
            (Assigned, Running) => true,
            (Assigned, Cancelled) => true,
            (Assigned, Completed) => true,
            (Assigned, Failed) => true,
            (Running, Completed) => true,
            (Running, Failed) => true,
            (Running, Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Assigned => "assigned",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Dispatch priority. Ordered high < normal < low for scheduling purposes
/// (§4.4 "List and order": rank high=0, normal=1, low=2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

/// Errors from task-level operations. Maps onto §7's "Precondition" and
/// "Blocked" error kinds.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: TaskStatus, to: TaskStatus },
    #[error("task {0} is already completed")]
    AlreadyCompleted(u64),
    #[error("task is not pending or already owned")]
    ClaimLost,
    #[error("task {0} references missing dependency {1}")]
    MissingDependency(u64, u64),
    #[error("task not found: {0}")]
    NotFound(u64),
}

/// A unit of work — §3 "Task".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub subject: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub owner: String,
    pub project: Option<String>,
    #[serde(rename = "workDir")]
    pub work_dir: Option<String>,
    #[serde(rename = "blockedBy", default)]
    pub blocked_by: Vec<u64>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    pub adapter: Option<String>,
    #[serde(rename = "callbackURL")]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub error: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Construct a new task. `owner` empty means unassigned (status
    /// `Pending`); non-empty means pre-assigned (status `Assigned`).
    pub fn new(id: u64, subject: impl Into<String>, owner: impl Into<String>, now: DateTime<Utc>) -> Self {
        let owner = owner.into();
        let status = if owner.is_empty() {
            TaskStatus::Pending
        } else {
            TaskStatus::Assigned
        };
        Self {
            id,
            subject: subject.into(),
            description: None,
            status,
            priority: Priority::default(),
            owner,
            project: None,
            work_dir: None,
            blocked_by: Vec::new(),
            session_id: None,
            adapter: None,
            callback_url: None,
            result: String::new(),
            error: String::new(),
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    fn transition(&mut self, to: TaskStatus, now: DateTime<Utc>) -> Result<(), TaskError> {
        if !self.status.can_transition_to(to) {
            return Err(TaskError::IllegalTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }

    /// Assign an unowned pending task to `owner`.
    pub fn assign(&mut self, owner: impl Into<String>, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.transition(TaskStatus::Assigned, now)?;
        self.owner = owner.into();
        Ok(())
    }

    /// Start an assigned task.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.transition(TaskStatus::Running, now)?;
        self.started_at = Some(now);
        Ok(())
    }

    pub fn complete(&mut self, result: impl Into<String>, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.transition(TaskStatus::Completed, now)?;
        self.result = result.into();
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> Result<(), TaskError> {
        self.transition(TaskStatus::Failed, now)?;
        self.error = error.into();
        self.completed_at = Some(now);
        Ok(())
    }

    /// Cancel. Refused on terminal statuses per §4.4.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), TaskError> {
        if self.status.is_terminal() {
            return Err(TaskError::IllegalTransition {
                from: self.status,
                to: TaskStatus::Cancelled,
            });
        }
        self.transition(TaskStatus::Cancelled, now)
    }

    /// True iff any dependency id refers to a task whose status is not
    /// `Completed`. `lookup` returns `None` for a missing dependency,
    /// which the caller treats as "blocked" (§4.4).
    pub fn is_blocked(&self, lookup: impl Fn(u64) -> Option<TaskStatus>) -> bool {
        self.blocked_by.iter().any(|dep| match lookup(*dep) {
            Some(TaskStatus::Completed) => false,
            _ => true,
        })
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
