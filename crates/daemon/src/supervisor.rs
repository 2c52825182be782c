// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor — §4.7. Spawns one `codesd agent run <team> <member>`
//! subprocess per supervised pair, restarts it with exponential backoff
//! on an unclean exit, resets the backoff after a crash-free window, and
//! reconciles stale on-disk agent-state records at startup.

use crate::poll::daemon_subprocess_args;
use crate::process::detach_from_controlling_terminal;
use chrono::{DateTime, Utc};
use codes_core::message::STOP_SENTINEL;
use codes_core::{AgentStatus, Clock, MessageType};
use codes_storage::{AgentStateRepo, MessageRepo, Store};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("could not resolve own executable path: {0}")]
    NoExecutable(#[from] std::io::Error),
}

/// Restart backoff — §4.7 "min(base × 2^(attempt−1), cap)", reset after
/// `crash_window` without a crash.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub crash_window: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(60),
            crash_window: Duration::from_secs(5 * 60),
        }
    }
}

impl BackoffPolicy {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let multiplier = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base.saturating_mul(multiplier).min(self.cap)
    }
}

/// Whether a restart should count as a fresh run (attempt 1) or continue
/// the existing backoff sequence, based on how long it's been since the
/// last restart (§4.7 "crash-window reset").
pub fn next_attempt(
    previous_attempt: u32,
    last_restart: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    crash_window: Duration,
) -> u32 {
    match last_restart {
        None => 1,
        Some(last) => {
            let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed >= crash_window {
                1
            } else {
                previous_attempt.saturating_add(1)
            }
        }
    }
}

/// Snapshot returned by [`Supervisor::health`] — §6 "Health query".
#[derive(Debug, Clone)]
pub struct AgentHealth {
    pub alive: bool,
    pub pid: i32,
    pub status: AgentStatus,
    pub uptime: Duration,
    pub restart_count: u32,
    pub last_crash: Option<DateTime<Utc>>,
    pub supervised: bool,
    pub error: Option<String>,
}

struct Tracked {
    attempt: u32,
    last_restart: Option<DateTime<Utc>>,
    stop_tx: watch::Sender<bool>,
}

/// Owns the supervised-process table for the whole `codesd` process.
pub struct Supervisor {
    store: Store,
    clock: Arc<dyn Clock>,
    policy: BackoffPolicy,
    executable: PathBuf,
    tracked: Mutex<HashMap<(String, String), Tracked>>,
}

impl Supervisor {
    pub fn new(store: Store, clock: Arc<dyn Clock>, policy: BackoffPolicy) -> Result<Self, SupervisorError> {
        let executable = crate::process::current_executable()?;
        Ok(Self {
            store,
            clock,
            policy,
            executable,
            tracked: Mutex::new(HashMap::new()),
        })
    }

    /// Starts supervising `(team, member)`: marks its agent-state record
    /// supervised, and spawns the restart loop in the background. A
    /// pair already tracked is left alone.
    pub fn spawn(self: &Arc<Self>, team: impl Into<String>, member: impl Into<String>) {
        let team = team.into();
        let member = member.into();
        let key = (team.clone(), member.clone());

        {
            let mut tracked = self.tracked.lock();
            if tracked.contains_key(&key) {
                return;
            }
            let (stop_tx, _rx) = watch::channel(false);
            tracked.insert(key, Tracked { attempt: 0, last_restart: None, stop_tx });
        }

        let supervisor = Arc::clone(self);
        tokio::spawn(async move { supervisor.restart_loop(team, member).await });
    }

    /// Requests a graceful stop: sends `__stop__` to the member (the
    /// running daemon handles it per §4.6 step 2) and tells the restart
    /// loop not to respawn once that process exits.
    pub fn stop(&self, team: &str, member: &str) {
        let key = (team.to_string(), member.to_string());
        if let Some(tracked) = self.tracked.lock().get(&key) {
            let _ = tracked.stop_tx.send(true);
        }
        let suffix = codes_core::id::RandomIdGen::short_hex(8);
        if let Err(e) =
            MessageRepo::new(&self.store).send(team, MessageType::System, "supervisor", member, STOP_SENTINEL, None, &suffix, self.clock.as_ref())
        {
            warn!(error = %e, team, member, "failed to send stop message");
        }
    }

    async fn restart_loop(self: Arc<Self>, team: String, member: String) {
        let mut stop_rx = {
            let tracked = self.tracked.lock();
            tracked.get(&(team.clone(), member.clone())).map(|t| t.stop_tx.subscribe())
        };

        loop {
            if stop_rx.as_ref().is_some_and(|rx| *rx.borrow()) {
                break;
            }

            let mut cmd = tokio::process::Command::new(&self.executable);
            cmd.args(daemon_subprocess_args(&team, &member));
            detach_from_controlling_terminal(&mut cmd);

            let spawned = cmd.spawn();
            let exit_status = match spawned {
                Ok(mut child) => child.wait().await,
                Err(e) => {
                    warn!(error = %e, team, member, "failed to spawn daemon subprocess");
                    Err(e)
                }
            };

            let clean_exit = matches!(&exit_status, Ok(status) if status.success());
            let now = self.clock.now();
            self.record_exit(&team, &member, now, clean_exit);

            if clean_exit {
                info!(team, member, "daemon exited cleanly, not restarting");
                break;
            }
            if stop_rx.as_ref().is_some_and(|rx| *rx.borrow()) {
                break;
            }

            let attempt = self.tracked.lock().get(&(team.clone(), member.clone())).map(|t| t.attempt).unwrap_or(1);
            let delay = self.policy.delay_for_attempt(attempt);
            warn!(team, member, attempt, delay_ms = delay.as_millis() as u64, "daemon exited uncleanly, restarting after backoff");

            if let Some(rx) = stop_rx.as_mut() {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = rx.changed() => {}
                }
            } else {
                tokio::time::sleep(delay).await;
            }
        }

        self.tracked.lock().remove(&(team, member));
    }

    fn record_exit(&self, team: &str, member: &str, now: DateTime<Utc>, clean: bool) {
        let mut tracked = self.tracked.lock();
        if let Some(entry) = tracked.get_mut(&(team.to_string(), member.to_string())) {
            entry.attempt = next_attempt(entry.attempt, entry.last_restart, now, self.policy.crash_window);
            entry.last_restart = Some(now);

            if !clean {
                let repo = AgentStateRepo::new(&self.store);
                if let Ok(Some(mut state)) = repo.get(team, member) {
                    state.restart_count += 1;
                    state.last_crash = Some(now);
                    state.supervised = true;
                    if let Err(e) = repo.save(&mut state, self.clock.as_ref()) {
                        warn!(error = %e, team, member, "failed to persist restart bookkeeping");
                    }
                }
            }
        }
    }

    /// Walks every team's agent-state records (§4.7 "stale-state
    /// reconciliation, for every agent-state file", walking `teams/`
    /// rather than a separate `agent/` index per the on-disk layout).
    /// `is_alive` zeroes the pid, marks the record stopped, and clears
    /// its current task as a side effect for every stale record it
    /// finds, supervised or not; only records marked `supervised` are
    /// then respawned.
    pub fn reconcile(self: &Arc<Self>) {
        let teams_dir = self.store.teams_dir();
        let Ok(entries) = std::fs::read_dir(&teams_dir) else { return };

        for entry in entries.filter_map(|e| e.ok()) {
            let Ok(file_type) = entry.file_type() else { continue };
            if !file_type.is_dir() {
                continue;
            }
            let team = entry.file_name().to_string_lossy().to_string();
            let agents_dir = self.store.agents_dir(&team);
            let Ok(agent_files) = std::fs::read_dir(&agents_dir) else { continue };

            for agent_file in agent_files.filter_map(|e| e.ok()) {
                let file_name = agent_file.file_name().to_string_lossy().to_string();
                let Some(member) = file_name.strip_suffix(".json") else { continue };

                let repo = AgentStateRepo::new(&self.store);
                let Ok(Some(state)) = repo.get(&team, member) else { continue };
                let alive = repo.is_alive(&team, member, self.clock.as_ref()).unwrap_or(false);
                if !alive && state.supervised {
                    info!(team, member, "reconciliation restarting a supervised agent with no live process");
                    self.spawn(team.clone(), member.to_string());
                }
            }
        }
    }

    /// §6 "Health query".
    pub fn health(&self, team: &str, member: &str) -> Option<AgentHealth> {
        let repo = AgentStateRepo::new(&self.store);
        let state = repo.get(team, member).ok().flatten()?;
        let alive = repo.is_alive(team, member, self.clock.as_ref()).unwrap_or(false);
        let uptime = if alive && state.status != AgentStatus::Stopped {
            (self.clock.now() - state.started_at).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        };

        Some(AgentHealth {
            alive,
            pid: state.pid,
            status: state.status,
            uptime,
            restart_count: state.restart_count,
            last_crash: state.last_crash,
            supervised: state.supervised,
            error: None,
        })
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
