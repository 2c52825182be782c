// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing wrapper for any [`Runner`], generalized from the teacher's
//! `TracedAgent`/`TracedSession` pattern.

use super::{Runner, RunnerError};
use async_trait::async_trait;
use codes_core::{AdapterCapabilities, RunConfig, RunResult};
use tracing::Instrument;

#[derive(Debug)]
pub struct TracedRunner<R> {
    inner: R,
}

impl<R> TracedRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: Runner> Runner for TracedRunner<R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn available(&self) -> bool {
        self.inner.available()
    }

    fn capabilities(&self) -> AdapterCapabilities {
        self.inner.capabilities()
    }

    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError> {
        let span = tracing::info_span!("runner.run", runner = self.inner.name(), work_dir = %config.work_dir.display());
        async {
            tracing::info!(prompt_len = config.prompt.len(), resume = config.resume, "starting");
            let start = std::time::Instant::now();
            let result = self.inner.run(config).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(r) if r.is_error() => {
                    tracing::warn!(elapsed_ms, error = %r.error_text, "run reported failure")
                }
                Ok(_) => tracing::info!(elapsed_ms, "run completed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "run failed to start"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
