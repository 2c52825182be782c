// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent state persistence and liveness check — §4.3 "Agent state".

use crate::{Store, StoreError};
use codes_core::{AgentState, AgentStatus, Clock};
use std::fs;
use std::io;
use sysinfo::{Pid, System};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentStateRepoError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub struct AgentStateRepo<'a> {
    store: &'a Store,
}

impl<'a> AgentStateRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Stamps `updated_at` and writes. Callers own constructing the rest
    /// of the record via [`AgentState`]'s mutators.
    pub fn save(&self, state: &mut AgentState, clock: &dyn Clock) -> Result<(), AgentStateRepoError> {
        state.updated_at = clock.now();
        fs::create_dir_all(self.store.agents_dir(&state.team))?;
        Store::write(&self.store.agent_state_path(&state.team, &state.name), state)?;
        Ok(())
    }

    pub fn get(&self, team: &str, member: &str) -> Result<Option<AgentState>, AgentStateRepoError> {
        match Store::read(&self.store.agent_state_path(team, member)) {
            Ok(state) => Ok(Some(state)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(&self, team: &str, member: &str) -> Result<(), AgentStateRepoError> {
        let path = self.store.agent_state_path(team, member);
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// False if no state, pid <= 0, or no live process holds that pid.
    /// As a side effect, a dead pid observed on a non-stopped record
    /// transitions that record to `Stopped` and clears the current task
    /// (§4.3, §4.7).
    pub fn is_alive(&self, team: &str, member: &str, clock: &dyn Clock) -> Result<bool, AgentStateRepoError> {
        let Some(mut state) = self.get(team, member)? else {
            return Ok(false);
        };

        if state.pid <= 0 || !process_is_running(state.pid) {
            if state.status != AgentStatus::Stopped {
                state.mark_dead(clock.now());
                self.save(&mut state, clock)?;
            }
            return Ok(false);
        }
        Ok(true)
    }
}

fn process_is_running(pid: i32) -> bool {
    let mut system = System::new();
    let pid = Pid::from_u32(pid as u32);
    system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[pid]), true);
    system.process(pid).is_some()
}

#[cfg(test)]
#[path = "agent_state_repo_tests.rs"]
mod tests;
