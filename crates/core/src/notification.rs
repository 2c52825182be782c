// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task notification schema — §6 "Notification JSON schema". Shared by
//! the daemon's reporting step (which writes the drop-file and feeds it
//! to output sinks) and the adapters crate's callback/hook sinks, so
//! every consumer agrees on one wire shape instead of each reinventing a
//! narrower event type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Completed,
    Failed,
    Cancelled,
}

/// The notification JSON schema itself — written to the drop-file,
/// POSTed as the outbound callback body, and piped to a shell hook's
/// standard input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNotification {
    pub team: String,
    #[serde(rename = "taskId")]
    pub task_id: u64,
    pub subject: String,
    pub status: NotificationStatus,
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}
