// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent state — §3 "Agent state". One record per (team, member).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Persisted daemon status for one (team, member) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub name: String,
    pub team: String,
    pub pid: i32,
    pub status: AgentStatus,
    /// 0 means "no current task".
    #[serde(rename = "currentTaskId", default)]
    pub current_task_id: u64,
    #[serde(rename = "currentTaskSubject", default)]
    pub current_task_subject: String,
    /// Opaque session id used to keep a direct-chat reply thread
    /// continuous across messages (§4.6 start sequence, §4.6.1).
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "restartCount", default)]
    pub restart_count: u32,
    #[serde(rename = "lastCrash")]
    pub last_crash: Option<DateTime<Utc>>,
    #[serde(default)]
    pub supervised: bool,
    #[serde(default)]
    pub activity: String,
}

impl AgentState {
    pub fn new(name: impl Into<String>, team: impl Into<String>, pid: i32, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            pid,
            status: AgentStatus::Idle,
            current_task_id: 0,
            current_task_subject: String::new(),
            session_id: None,
            started_at: now,
            updated_at: now,
            restart_count: 0,
            last_crash: None,
            supervised: false,
            activity: "idle".to_string(),
        }
    }

    /// Set current-task fields and mark running; stamps `updated_at`.
    pub fn begin_task(&mut self, task_id: u64, subject: impl Into<String>, now: DateTime<Utc>) {
        self.status = AgentStatus::Running;
        self.current_task_id = task_id;
        self.current_task_subject = subject.into();
        self.activity = format!("executing task #{task_id}");
        self.updated_at = now;
    }

    /// Clear current-task fields and mark idle; stamps `updated_at`.
    pub fn finish_task(&mut self, now: DateTime<Utc>) {
        self.status = AgentStatus::Idle;
        self.current_task_id = 0;
        self.current_task_subject.clear();
        self.activity = "idle".to_string();
        self.updated_at = now;
    }

    /// Mark this record as belonging to a process that is no longer
    /// alive (§4.3 `isAlive` side effect, §4.7 stale-state reconciliation).
    pub fn mark_dead(&mut self, now: DateTime<Utc>) {
        self.pid = 0;
        self.status = AgentStatus::Stopped;
        self.current_task_id = 0;
        self.current_task_subject.clear();
        self.updated_at = now;
    }

    pub fn set_activity(&mut self, activity: impl Into<String>, now: DateTime<Utc>) {
        self.activity = activity.into();
        self.updated_at = now;
    }
}

#[cfg(test)]
#[path = "agent_state_tests.rs"]
mod tests;
