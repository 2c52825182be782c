// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message — §3 "Message". Immutable once written except the read flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The sentinel content that tells a daemon to stop (§4.6 step 2).
pub const STOP_SENTINEL: &str = "__stop__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Chat,
    TaskCompleted,
    TaskFailed,
    System,
    Progress,
    Discovery,
}

impl MessageType {
    /// Informational types that are always marked read and skipped by the
    /// daemon's message-processing policy (§4.6.1).
    pub fn is_informational(self) -> bool {
        !matches!(self, MessageType::Chat)
    }
}

/// Immutable log record enabling chat and task-report fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub sender: String,
    /// Empty means broadcast.
    pub recipient: String,
    pub content: String,
    #[serde(rename = "referencedTaskId")]
    pub referenced_task_id: Option<u64>,
    pub read: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Compose the id `{UTC-YYYYMMDDTHHMMSS.nnnnnnnnn}-{from}-{recipientOrBroadcast}-{8hexRand}`.
    /// Lexicographic order on this id approximates creation-time order
    /// (§3, §5 "ordering guarantees").
    pub fn compose_id(now: DateTime<Utc>, sender: &str, recipient: &str, random_suffix: &str) -> String {
        let ts = now.format("%Y%m%dT%H%M%S.%9f");
        let to = if recipient.is_empty() { "broadcast" } else { recipient };
        format!("{ts}-{sender}-{to}-{random_suffix}")
    }

    pub fn is_broadcast(&self) -> bool {
        self.recipient.is_empty()
    }

    /// Whether this message is visible to `member` per §4.3
    /// `getFor`: recipient equals member OR recipient is empty.
    pub fn addressed_to(&self, member: &str) -> bool {
        self.is_broadcast() || self.recipient == member
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
