// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM-runner adapter — §4.5. Strategy objects wrapping an external
//! command-line LLM runner; the daemon depends only on the [`Runner`]
//! trait, never on a concrete binary.

mod cli;
pub mod registry;
mod traced;

pub use cli::CliRunner;
pub use registry::RunnerRegistry;
pub use traced::TracedRunner;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRunner, RunnerCall};

use async_trait::async_trait;
use codes_core::{AdapterCapabilities, RunConfig, RunResult};
use thiserror::Error;

/// Failure to even start a run. A subprocess that runs to completion but
/// reports an application-level failure is *not* an error here — per
/// §9's design notes, that's surfaced as `RunResult::is_error() == true`
/// so the daemon's completion path doesn't need to distinguish "runner
/// failed to run" from "runner ran and reported failure".
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("runner {0} is not available")]
    Unavailable(String),
    #[error("runner {0} failed to start: {1}")]
    SpawnFailed(String, String),
}

/// A strategy wrapping an external command-line LLM runner.
#[async_trait]
pub trait Runner: std::fmt::Debug + Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Cheap best-effort check, e.g. the target binary is on `PATH`.
    fn available(&self) -> bool;

    fn capabilities(&self) -> AdapterCapabilities;

    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError>;
}
