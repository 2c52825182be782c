// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake output sink for testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{OutputSink, SinkError, SinkEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Recorded call to a [`FakeSink`].
#[derive(Debug, Clone)]
pub struct SinkCall {
    pub team: String,
    pub task_id: u64,
    pub title: String,
    pub body: String,
}

struct FakeSinkState {
    calls: Vec<SinkCall>,
    next_error: Option<String>,
}

/// Records every event it is asked to send; can be armed to fail once.
#[derive(Clone)]
pub struct FakeSink {
    inner: Arc<Mutex<FakeSinkState>>,
}

impl Default for FakeSink {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSinkState {
                calls: Vec::new(),
                next_error: None,
            })),
        }
    }
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.lock().calls.clone()
    }

    pub fn fail_next(&self, reason: impl Into<String>) {
        self.inner.lock().next_error = Some(reason.into());
    }
}

#[async_trait]
impl OutputSink for FakeSink {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn send(&self, event: &SinkEvent) -> Result<(), SinkError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SinkCall {
            team: event.team.clone(),
            task_id: event.task_id,
            title: event.title.clone(),
            body: event.body.clone(),
        });
        if let Some(reason) = inner.next_error.take() {
            return Err(SinkError::SendFailed(reason));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
