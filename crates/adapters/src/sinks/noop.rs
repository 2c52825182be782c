// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op sink.

use super::{OutputSink, SinkError, SinkEvent};
use async_trait::async_trait;

/// Sink that silently discards every event. Used when no sink is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpSink;

impl NoOpSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputSink for NoOpSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn send(&self, _event: &SinkEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
