// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI-subprocess runner — shells out to a named binary once per `run`
//! call and parses one line of structured JSON from its stdout. This is
//! the "one concrete adapter" of §2's component table; it deliberately
//! does not drive an interactive session the way a terminal-multiplexed
//! agent would — the contract is closer to a filter than a REPL.

use super::{Runner, RunnerError};
use async_trait::async_trait;
use codes_core::{AdapterCapabilities, RunConfig, RunResult};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::subprocess::run_with_timeout;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// One line of structured output the target binary is expected to emit
/// on stdout, e.g. `claude --output-format json`.
#[derive(Debug, Deserialize)]
struct CliOutput {
    #[serde(default)]
    result: String,
    #[serde(default, rename = "is_error")]
    is_error: bool,
    #[serde(default)]
    error: String,
    #[serde(default, rename = "session_id")]
    session_id: Option<String>,
    #[serde(default)]
    usage: Option<CliUsage>,
}

#[derive(Debug, Deserialize)]
struct CliUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default, rename = "cache_read_input_tokens")]
    cache_read_tokens: u64,
    #[serde(default, rename = "cache_creation_input_tokens")]
    cache_write_tokens: u64,
    #[serde(default, rename = "total_cost_usd")]
    total_usd: f64,
}

/// Invokes `binary_name --print --output-format json [--resume
/// --session-id <id> --fork-session] [--model <m>] [--system-prompt <sp>]
/// [--allowedTools <tool>]* [--max-turns <n>] [--<permission-mode>]
/// <prompt>`. Adapter-specific flags beyond that are out of scope; a
/// deployment that needs a different CLI contract implements its own
/// [`Runner`].
#[derive(Debug)]
pub struct CliRunner {
    name: String,
    binary_name: String,
}

impl CliRunner {
    pub fn new(name: impl Into<String>, binary_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binary_name: binary_name.into(),
        }
    }

    fn build_command(&self, config: &RunConfig) -> Command {
        let mut cmd = Command::new(&self.binary_name);
        cmd.current_dir(&config.work_dir);
        cmd.arg("--print").arg("--output-format").arg("json");
        if config.resume {
            if let Some(session_id) = &config.session_id {
                cmd.arg("--resume").arg("--session-id").arg(session_id).arg("--fork-session");
            }
        }
        if let Some(model) = &config.model {
            cmd.arg("--model").arg(model);
        }
        if let Some(system_prompt) = &config.system_prompt {
            cmd.arg("--system-prompt").arg(system_prompt);
        }
        for tool in &config.allowed_tools {
            cmd.arg("--allowedTools").arg(tool);
        }
        if let Some(max_turns) = config.max_turns {
            cmd.arg("--max-turns").arg(max_turns.to_string());
        }
        if let Some(permission_mode) = &config.permission_mode {
            cmd.arg(format!("--{permission_mode}"));
        }
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        cmd.arg(&config.prompt);
        cmd.stdin(std::process::Stdio::null());
        // Aborting the task awaiting `run` (external cancellation, §4.6.4)
        // drops the in-flight `Command::output()` future; kill_on_drop
        // makes that actually terminate the subprocess instead of
        // orphaning it.
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Runner for CliRunner {
    fn name(&self) -> &str {
        &self.name
    }

    fn available(&self) -> bool {
        which(&self.binary_name).is_some()
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities {
            session_persistence: true,
            structured_output: true,
            model_selection: true,
            cost_reporting: true,
        }
    }

    async fn run(&self, config: &RunConfig) -> Result<RunResult, RunnerError> {
        if !self.available() {
            return Err(RunnerError::Unavailable(self.name.clone()));
        }

        let cmd = self.build_command(config);
        let timeout = config.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let started = Instant::now();
        let output = run_with_timeout(cmd, timeout, &self.name)
            .await
            .map_err(|e| RunnerError::SpawnFailed(self.name.clone(), e))?;
        let duration = started.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed: Option<CliOutput> = stdout.lines().rev().find_map(|line| serde_json::from_str(line).ok());

        match parsed {
            Some(parsed) if parsed.is_error => Ok(RunResult {
                result_text: parsed.result,
                error_text: if parsed.error.is_empty() {
                    "runner reported an error".to_string()
                } else {
                    parsed.error
                },
                session_id: parsed.session_id,
                cost: parsed.usage.map(|u| codes_core::RunCost {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                    cache_read_tokens: u.cache_read_tokens,
                    cache_write_tokens: u.cache_write_tokens,
                    total_usd: u.total_usd,
                }),
                duration,
            }),
            Some(parsed) => Ok(RunResult {
                result_text: parsed.result,
                error_text: String::new(),
                session_id: parsed.session_id,
                cost: parsed.usage.map(|u| codes_core::RunCost {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                    cache_read_tokens: u.cache_read_tokens,
                    cache_write_tokens: u.cache_write_tokens,
                    total_usd: u.total_usd,
                }),
                duration,
            }),
            None if !output.status.success() => Ok(RunResult {
                result_text: String::new(),
                error_text: format!(
                    "{} exited with {}: {}",
                    self.binary_name,
                    output.status,
                    String::from_utf8_lossy(&output.stderr)
                ),
                session_id: config.session_id.clone(),
                cost: None,
                duration,
            }),
            None => Ok(RunResult {
                result_text: stdout.trim().to_string(),
                error_text: String::new(),
                session_id: config.session_id.clone(),
                cost: None,
                duration,
            }),
        }
    }
}

/// Minimal `PATH` search; avoids pulling in a dedicated `which` crate
/// for a single binary lookup. A name containing a path separator is
/// checked directly rather than searched for.
fn which(binary_name: &str) -> Option<std::path::PathBuf> {
    let candidate = std::path::Path::new(binary_name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let candidate = dir.join(binary_name);
        candidate.is_file().then_some(candidate)
    })
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
