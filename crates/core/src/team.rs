// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team and member — §3 "Team" / "Member".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A member registered within a team. Has no independent lifecycle — it
/// only ever lives inside a [`Team`]'s member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique within the team.
    pub name: String,
    pub role: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "type")]
    pub member_type: Option<String>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: None,
            model: None,
            member_type: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Named workspace scoping tasks, messages, and members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub description: Option<String>,
    pub working_dir: Option<String>,
    pub members: Vec<Member>,
    pub created_at: DateTime<Utc>,
}

/// Errors surfaced by team-level mutations. [`TeamError::AlreadyExists`] and
/// [`TeamError::NotFound`] map to the "Already exists" / "Not found" error
/// kinds in spec.md §7; `MemberNotFound` is a variant of "Not found" scoped
/// to the member list.
#[derive(Debug, Error)]
pub enum TeamError {
    #[error("team already exists: {0}")]
    AlreadyExists(String),
    #[error("team not found: {0}")]
    NotFound(String),
    #[error("member already exists: {0}")]
    MemberAlreadyExists(String),
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error("invalid team name: {0}")]
    InvalidName(String),
}

/// Filesystem-safe team/member name: non-empty, ASCII alphanumerics plus
/// `-`/`_`, no path separators. Keeps `{root}/<name>` from ever escaping
/// the teams directory.
pub fn is_filesystem_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Team {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Result<Self, TeamError> {
        let name = name.into();
        if !is_filesystem_safe_name(&name) {
            return Err(TeamError::InvalidName(name));
        }
        Ok(Self {
            name,
            description: None,
            working_dir: None,
            members: Vec::new(),
            created_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<String>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), TeamError> {
        if self.member(&member.name).is_some() {
            return Err(TeamError::MemberAlreadyExists(member.name));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn remove_member(&mut self, name: &str) -> Result<Member, TeamError> {
        let idx = self
            .members
            .iter()
            .position(|m| m.name == name)
            .ok_or_else(|| TeamError::MemberNotFound(name.to_string()))?;
        Ok(self.members.remove(idx))
    }
}

#[cfg(test)]
#[path = "team_tests.rs"]
mod tests;
