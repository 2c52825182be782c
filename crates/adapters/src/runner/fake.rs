// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake runner for deterministic testing.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Runner, RunnerError};
use async_trait::async_trait;
use codes_core::{AdapterCapabilities, RunConfig, RunResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunnerCall {
    pub prompt: String,
    pub work_dir: String,
}

#[derive(Debug)]
struct FakeRunnerState {
    calls: Vec<RunnerCall>,
    queued_results: Vec<Result<RunResult, RunnerError>>,
    available: bool,
}

#[derive(Debug, Clone)]
pub struct FakeRunner {
    name: String,
    capabilities: AdapterCapabilities,
    inner: Arc<Mutex<FakeRunnerState>>,
}

impl FakeRunner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: AdapterCapabilities::default(),
            inner: Arc::new(Mutex::new(FakeRunnerState {
                calls: Vec::new(),
                queued_results: Vec::new(),
                available: true,
            })),
        }
    }

    pub fn with_capabilities(mut self, capabilities: AdapterCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.inner.lock().available = available;
    }

    /// Queue a result to return on the next `run` call, FIFO.
    pub fn queue_result(&self, result: Result<RunResult, RunnerError>) {
        self.inner.lock().queued_results.push(result);
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl Runner for FakeRunner {
    fn name(&self) -> &str {
        &self.name
    }

    fn available(&self) -> bool {
        self.inner.lock().available
    }

    fn capabilities(&self) -> AdapterCapabilities {
        self.capabilities
    }

    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RunnerCall {
            prompt: config.prompt.clone(),
            work_dir: config.work_dir.display().to_string(),
        });
        if inner.queued_results.is_empty() {
            return Ok(RunResult {
                result_text: "fake result".to_string(),
                error_text: String::new(),
                session_id: config.session_id.clone(),
                cost: None,
                duration: Duration::from_millis(1),
            });
        }
        inner.queued_results.remove(0)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
