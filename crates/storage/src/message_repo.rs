// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message send/broadcast/query — §4.3 "Messages".

use crate::{Store, StoreError};
use codes_core::{Clock, Message, MessageType};
use std::fs;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageRepoError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub struct MessageRepo<'a> {
    store: &'a Store,
}

impl<'a> MessageRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Compose an id, write the message file. Messages are never
    /// deleted or edited by the core once written (save for `markRead`).
    pub fn send(
        &self,
        team: &str,
        message_type: MessageType,
        from: &str,
        to: &str,
        content: &str,
        referenced_task_id: Option<u64>,
        random_suffix: &str,
        clock: &dyn Clock,
    ) -> Result<Message, MessageRepoError> {
        let now = clock.now();
        let id = Message::compose_id(now, from, to, random_suffix);
        let message = Message {
            id: id.clone(),
            message_type,
            sender: from.to_string(),
            recipient: to.to_string(),
            content: content.to_string(),
            referenced_task_id,
            read: false,
            created_at: now,
        };
        fs::create_dir_all(self.store.messages_dir(team))?;
        Store::write(&self.store.message_path(team, &id), &message)?;
        Ok(message)
    }

    pub fn broadcast(
        &self,
        team: &str,
        message_type: MessageType,
        from: &str,
        content: &str,
        random_suffix: &str,
        clock: &dyn Clock,
    ) -> Result<Message, MessageRepoError> {
        self.send(team, message_type, from, "", content, None, random_suffix, clock)
    }

    pub fn get(&self, team: &str, id: &str) -> Result<Message, MessageRepoError> {
        Store::read(&self.store.message_path(team, id)).map_err(Into::into)
    }

    fn all(&self, team: &str) -> Result<Vec<Message>, MessageRepoError> {
        let dir = self.store.messages_dir(team);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut messages = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let file_name = entry.file_name();
            if !file_name.to_string_lossy().ends_with(".json") {
                continue;
            }
            messages.push(Store::read(&entry.path())?);
        }
        messages.sort_by(|a: &Message, b: &Message| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    /// Messages addressed to `member` (broadcast or exact recipient
    /// match), sorted by creation time ascending; optionally unread only.
    pub fn get_for(&self, team: &str, member: &str, unread_only: bool) -> Result<Vec<Message>, MessageRepoError> {
        Ok(self
            .all(team)?
            .into_iter()
            .filter(|m| m.addressed_to(member))
            .filter(|m| !unread_only || !m.read)
            .collect())
    }

    pub fn get_by_type(
        &self,
        team: &str,
        member: &str,
        unread_only: bool,
        message_type: MessageType,
    ) -> Result<Vec<Message>, MessageRepoError> {
        Ok(self
            .get_for(team, member, unread_only)?
            .into_iter()
            .filter(|m| m.message_type == message_type)
            .collect())
    }

    /// Newest `limit` messages across the whole team, regardless of
    /// recipient.
    pub fn get_all_for_team(&self, team: &str, limit: usize) -> Result<Vec<Message>, MessageRepoError> {
        let mut messages = self.all(team)?;
        if messages.len() > limit {
            messages.drain(0..messages.len() - limit);
        }
        Ok(messages)
    }

    pub fn mark_read(&self, team: &str, id: &str) -> Result<Message, MessageRepoError> {
        let mut message = self.get(team, id)?;
        message.read = true;
        Store::write(&self.store.message_path(team, id), &message)?;
        Ok(message)
    }
}

#[cfg(test)]
#[path = "message_repo_tests.rs"]
mod tests;
