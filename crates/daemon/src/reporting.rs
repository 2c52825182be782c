// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reporting & callbacks — §4.6.5. Three best-effort steps run in order
//! on task completion, failure, or cancellation: a broadcast message, a
//! notification drop-file, and a fan-out to side channels (desktop,
//! webhooks, shell hook, per-task callback). Every failure here is
//! logged and swallowed — §7 "External sink failure" never fails the
//! task.

use crate::notifications::write_notification;
use codes_adapters::{CallbackSink, OutputSink, SinkEvent};
use codes_core::id::RandomIdGen;
use codes_core::{Clock, MessageType, NotificationStatus, Task, TaskNotification};
use codes_storage::{MessageRepo, Store};
use std::sync::Arc;
use tracing::warn;

const REPORT_TRUNCATE_LEN: usize = 500;

/// The three terminal outcomes a task report can carry.
pub enum ReportOutcome {
    Completed { result: String },
    Failed { error: String },
    Cancelled { partial_result: Option<String> },
}

/// Bundles the dependencies `report` needs so the daemon's call sites
/// stay short. Cheap to construct per call — every field is a
/// reference or an `Arc`.
pub struct Reporter<'a> {
    pub store: &'a Store,
    pub clock: &'a dyn Clock,
    pub sinks: &'a [Arc<dyn OutputSink>],
}

impl<'a> Reporter<'a> {
    pub async fn report(&self, team: &str, agent: &str, task: &Task, outcome: ReportOutcome) {
        self.broadcast(team, agent, task, &outcome);
        let notification = self.build_notification(team, agent, task, &outcome);
        self.drop_notification(task, &notification);
        self.push_side_channels(team, task, &outcome, &notification).await;
    }

    fn broadcast(&self, team: &str, agent: &str, task: &Task, outcome: &ReportOutcome) {
        let (message_type, header, body) = match outcome {
            ReportOutcome::Completed { result } => {
                (MessageType::TaskCompleted, "completed", result.as_str())
            }
            ReportOutcome::Failed { error } => (MessageType::TaskFailed, "failed", error.as_str()),
            ReportOutcome::Cancelled { partial_result } => (
                MessageType::Chat,
                "cancelled",
                partial_result.as_deref().unwrap_or(""),
            ),
        };
        let content = format!("task #{} ({}) {header}: {}", task.id, task.subject, truncate(body));
        let repo = MessageRepo::new(self.store);
        let suffix = RandomIdGen::short_hex(8);
        if let Err(e) = repo.broadcast(team, message_type, agent, &content, &suffix, self.clock) {
            warn!(error = %e, task_id = task.id, "failed to broadcast task report");
        }
    }

    fn build_notification(&self, team: &str, agent: &str, task: &Task, outcome: &ReportOutcome) -> TaskNotification {
        let (status, result, error) = match outcome {
            ReportOutcome::Completed { result } => {
                (NotificationStatus::Completed, Some(result.clone()), None)
            }
            ReportOutcome::Failed { error } => (NotificationStatus::Failed, None, Some(error.clone())),
            ReportOutcome::Cancelled { partial_result } => {
                (NotificationStatus::Cancelled, partial_result.clone(), None)
            }
        };
        TaskNotification {
            team: team.to_string(),
            task_id: task.id,
            subject: task.subject.clone(),
            status,
            agent: agent.to_string(),
            result,
            error,
            timestamp: self.clock.now(),
        }
    }

    fn drop_notification(&self, task: &Task, notification: &TaskNotification) {
        if let Err(e) = write_notification(self.store, notification) {
            warn!(error = %e, task_id = task.id, "failed to write notification drop-file");
        }
    }

    async fn push_side_channels(&self, team: &str, task: &Task, outcome: &ReportOutcome, notification: &TaskNotification) {
        let (title, body) = match outcome {
            ReportOutcome::Completed { result } => (format!("task #{} completed", task.id), result.clone()),
            ReportOutcome::Failed { error } => (format!("task #{} failed", task.id), error.clone()),
            ReportOutcome::Cancelled { partial_result } => (
                format!("task #{} cancelled", task.id),
                partial_result.clone().unwrap_or_default(),
            ),
        };
        let event = SinkEvent {
            team: team.to_string(),
            task_id: task.id,
            title,
            body,
            notification: notification.clone(),
        };

        for sink in self.sinks {
            if let Err(e) = sink.send(&event).await {
                warn!(sink = sink.name(), error = %e, task_id = task.id, "output sink failed");
            }
        }

        if let Some(url) = &task.callback_url {
            let callback = CallbackSink::new(url.clone());
            if let Err(e) = callback.send(notification).await {
                warn!(error = %e, task_id = task.id, "task callback failed");
            }
        }
    }
}

/// Truncates to at most [`REPORT_TRUNCATE_LEN`] chars on a char
/// boundary (§4.6.5 "a short header plus a truncated (500-char)
/// result or error").
fn truncate(s: &str) -> String {
    match s.char_indices().nth(REPORT_TRUNCATE_LEN) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Builds the short reply a direct chat message gets when the adapter
/// itself reported an error (§4.6.1).
pub fn error_reply(detail: &str) -> String {
    format!("[error] {detail}")
}

/// Builds the informational-vs-empty reply for a successful direct
/// chat turn (§4.6.1: "(no response generated)" when empty).
pub fn chat_reply(result_text: &str) -> &str {
    if result_text.is_empty() {
        "(no response generated)"
    } else {
        result_text
    }
}

/// Used by `Daemon::process_messages` to build the prompt for an
/// incoming direct chat message (§4.6.1).
pub fn chat_prompt(sender: &str, content: &str) -> String {
    format!(
        "Message from {sender}:\n\n{content}\n\nRespond concisely; if this is a work request, do the work and report results.",
    )
}

/// Used to build the system prompt for a spawned task worker (§4.6.3).
pub fn task_system_prompt(agent: &str, team: &str, role: &str, work_dir: &str, project: Option<&str>) -> String {
    let project_line = project.map(|p| format!("\nProject: {p}")).unwrap_or_default();
    format!(
        "You are {agent}, a {role} on team {team}.\nWorking directory: {work_dir}{project_line}\n\n\
Complete the assigned task directly in the working directory. Report the outcome concisely.",
    )
}

#[cfg(test)]
#[path = "reporting_tests.rs"]
mod tests;
