// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders shared by downstream crates (`storage`, `adapters`,
//! `daemon`). Gated behind `test-support` so production builds never link
//! it in, matching the teacher's `oj-core::test_support` convention.

use crate::{Message, MessageType, Task};
use chrono::{DateTime, Utc};

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

pub fn sample_task(id: u64, owner: &str) -> Task {
    Task::new(id, format!("task {id}"), owner, fixed_time())
}

pub fn sample_message(sender: &str, recipient: &str, content: &str) -> Message {
    Message {
        id: format!("{}-{}-{}-00000000", sender, recipient, fixed_time().timestamp()),
        message_type: MessageType::Chat,
        sender: sender.to_string(),
        recipient: recipient.to_string(),
        content: content.to_string(),
        referenced_task_id: None,
        read: false,
        created_at: fixed_time(),
    }
}
