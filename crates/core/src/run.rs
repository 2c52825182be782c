// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Types shared at the LLM-runner adapter boundary — §4.5.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Capabilities an adapter declares so callers can make policy decisions
/// without knowing the concrete adapter (§4.5 "capabilities()").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterCapabilities {
    pub session_persistence: bool,
    pub structured_output: bool,
    pub model_selection: bool,
    pub cost_reporting: bool,
}

/// Input to one adapter invocation.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub prompt: String,
    pub work_dir: PathBuf,
    pub model: Option<String>,
    pub session_id: Option<String>,
    pub resume: bool,
    pub timeout: Option<Duration>,
    pub env: Vec<(String, String)>,
    pub system_prompt: Option<String>,
    pub allowed_tools: Vec<String>,
    pub max_turns: Option<u32>,
    pub permission_mode: Option<String>,
}

impl RunConfig {
    pub fn new(prompt: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            prompt: prompt.into(),
            work_dir: work_dir.into(),
            ..Default::default()
        }
    }
}

/// Token/cost accounting, when the adapter reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunCost {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read_tokens: u64,
    pub cache_write_tokens: u64,
    pub total_usd: f64,
}

/// Output of one adapter invocation.
///
/// Subprocess failure is *not* signalled as an `Err` from `run` in the
/// default adapter — it surfaces here as a non-empty `error_text`; the
/// caller inspects both (§4.5, §9 "exception-style control flow").
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub result_text: String,
    pub error_text: String,
    pub session_id: Option<String>,
    pub cost: Option<RunCost>,
    pub duration: Duration,
}

impl RunResult {
    /// §9: "a subprocess non-zero exit is surfaced as `isError=true`... so
    /// the daemon's completion path can uniformly route to the failed
    /// branch".
    pub fn is_error(&self) -> bool {
        !self.error_text.is_empty()
    }
}

/// Adapter-specific session configuration blobs, keyed by adapter name,
/// carried alongside a task/agent spawn the way the teacher's
/// `AgentSpawnConfig::session_config` does.
pub type SessionConfig = HashMap<String, serde_json::Value>;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
