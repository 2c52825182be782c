// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output sinks — §10. Narrow fire-and-forget interfaces for surfacing a
//! terminal task event outside the core: desktop toast, webhook POST,
//! shell-hook script execution, HTTP callback POST. A sink failure is
//! logged and swallowed; it never fails the task (§7 "External sink
//! failure").

mod callback;
mod desktop;
mod hook;
mod noop;
mod webhook;

pub use callback::CallbackSink;
pub use desktop::DesktopSink;
pub use hook::HookSink;
pub use noop::NoOpSink;
pub use webhook::WebhookSink;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSink, SinkCall};

use async_trait::async_trait;
use codes_core::TaskNotification;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// An event worth surfacing outside the core: task id, its team, a short
/// title, a free-form body (usually the result or error text), and the
/// full notification schema (§6) for sinks that need to forward it
/// verbatim rather than a flattened title/body.
#[derive(Debug, Clone)]
pub struct SinkEvent {
    pub team: String,
    pub task_id: u64,
    pub title: String,
    pub body: String,
    pub notification: TaskNotification,
}

/// An external fan-out target for [`SinkEvent`]s.
#[async_trait]
pub trait OutputSink: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    async fn send(&self, event: &SinkEvent) -> Result<(), SinkError>;
}
