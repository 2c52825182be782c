// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon process configuration — base directory resolution, poll
//! interval, and the log file path shared by the `codesd` binary's
//! `agent run` and `supervisor run` subcommands.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default tick interval for the poll loop (§4.6 "Poll loop").
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory (set CODES_HOME or HOME)")]
    NoHomeDir,
}

/// Resolves the base directory rooting `teams/` and `notifications/`
/// (§6 "On-disk layout"). `CODES_HOME` overrides the default
/// `{home}/.codes`, primarily so tests and operators get filesystem
/// isolation without touching a real home directory.
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("CODES_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| ConfigError::NoHomeDir)?;
    Ok(PathBuf::from(home).join(".codes"))
}

/// Where the daemon process log lives, alongside the base directory
/// rather than inside it (teams/notifications are data, the log is
/// operational).
pub fn log_path(base: &std::path::Path) -> PathBuf {
    base.join("daemon.log")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
