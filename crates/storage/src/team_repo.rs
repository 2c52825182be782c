// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team directory lifecycle and member roster mutation — §4.1, §5.1-§5.2.

use crate::{FileLock, Store, StoreError};
use codes_core::{Clock, Member, Team, TeamError};
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TeamRepoError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Team(#[from] TeamError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads and mutates `{root}/teams/<name>/config.json`.
pub struct TeamRepo<'a> {
    store: &'a Store,
}

impl<'a> TeamRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn exists(&self, name: &str) -> bool {
        Store::exists(&self.store.team_config_path(name))
    }

    /// Creates `teams/<name>/{tasks,messages,agents}` and the config file.
    /// Errors if a team with this name already exists. On any failure
    /// partway through, the partially created directory is removed
    /// rather than left behind in an inconsistent state.
    pub fn create(&self, name: &str, clock: &dyn Clock) -> Result<Team, TeamRepoError> {
        if self.exists(name) {
            return Err(TeamRepoError::Team(TeamError::AlreadyExists(name.to_string())));
        }
        match self.try_create(name, clock) {
            Ok(team) => Ok(team),
            Err(e) => {
                let _ = fs::remove_dir_all(self.store.team_dir(name));
                Err(e)
            }
        }
    }

    fn try_create(&self, name: &str, clock: &dyn Clock) -> Result<Team, TeamRepoError> {
        let team = Team::new(name, clock.now())?;
        fs::create_dir_all(self.store.tasks_dir(name))?;
        fs::create_dir_all(self.store.messages_dir(name))?;
        fs::create_dir_all(self.store.agents_dir(name))?;
        Store::write(&self.store.team_config_path(name), &team)?;
        Ok(team)
    }

    /// Recursively removes `teams/<name>` and all subordinate state.
    pub fn delete(&self, name: &str) -> Result<(), TeamRepoError> {
        match fs::remove_dir_all(self.store.team_dir(name)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get(&self, name: &str) -> Result<Team, TeamRepoError> {
        Store::read(&self.store.team_config_path(name)).map_err(Into::into)
    }

    pub fn list(&self) -> Result<Vec<Team>, TeamRepoError> {
        let dir = self.store.teams_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut teams = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.exists(&name) {
                teams.push(self.get(&name)?);
            }
        }
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    /// Locked read-modify-write over a team's config, mirroring
    /// [`crate::task_repo::TaskRepo::update`]'s contract.
    pub fn update<F>(&self, name: &str, mutate: F) -> Result<Team, TeamRepoError>
    where
        F: FnOnce(&mut Team) -> Result<(), TeamError>,
    {
        let lock_path = self.store.team_dir(name).join("config.json.lock");
        let _lock = FileLock::acquire(&lock_path)?;
        let mut team = self.get(name)?;
        mutate(&mut team)?;
        Store::write(&self.store.team_config_path(name), &team)?;
        Ok(team)
    }

    pub fn add_member(&self, team: &str, member: Member) -> Result<Team, TeamRepoError> {
        self.update(team, move |t| t.add_member(member))
    }

    /// Removes `member` from the roster and deletes its agent-state file,
    /// if one exists (§4.3 "Teams" `removeMember`).
    pub fn remove_member(&self, team: &str, member: &str) -> Result<Team, TeamRepoError> {
        let updated = self.update(team, move |t| t.remove_member(member).map(|_| ()))?;
        let state_path = self.store.agent_state_path(team, member);
        match fs::remove_file(state_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "team_repo_tests.rs"]
mod tests;
