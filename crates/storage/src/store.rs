// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path derivation and atomic JSON persistence — §4.1.

use codes_core::id::RandomIdGen;
use codes_core::IdGen;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// §7 distinguishes "not found" from every other I/O failure so callers
/// can branch on absence without string-matching an error message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed json at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Rooted at an operator-chosen base directory (default
/// `{home}/.codes`); derives every on-disk path named in §6's layout.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn teams_dir(&self) -> PathBuf {
        self.root.join("teams")
    }

    pub fn team_dir(&self, team: &str) -> PathBuf {
        self.teams_dir().join(team)
    }

    pub fn team_config_path(&self, team: &str) -> PathBuf {
        self.team_dir(team).join("config.json")
    }

    pub fn tasks_dir(&self, team: &str) -> PathBuf {
        self.team_dir(team).join("tasks")
    }

    pub fn task_path(&self, team: &str, id: u64) -> PathBuf {
        self.tasks_dir(team).join(format!("{id}.json"))
    }

    pub fn task_lock_path(&self, team: &str, id: u64) -> PathBuf {
        self.tasks_dir(team).join(format!("{id}.json.lock"))
    }

    pub fn messages_dir(&self, team: &str) -> PathBuf {
        self.team_dir(team).join("messages")
    }

    pub fn message_path(&self, team: &str, id: &str) -> PathBuf {
        self.messages_dir(team).join(format!("{id}.json"))
    }

    pub fn agents_dir(&self, team: &str) -> PathBuf {
        self.team_dir(team).join("agents")
    }

    pub fn agent_state_path(&self, team: &str, member: &str) -> PathBuf {
        self.agents_dir(team).join(format!("{member}.json"))
    }

    pub fn notifications_dir(&self) -> PathBuf {
        self.root.join("notifications")
    }

    pub fn notification_path(&self, team: &str, task_id: u64) -> PathBuf {
        self.notifications_dir().join(format!("{team}__{task_id}.json"))
    }

    /// Serialize `value` as pretty-printed JSON, write to `{path}.tmp`,
    /// then rename over `path`. A reader that opens `path` observes
    /// either the last fully-written prior value or the new one, never a
    /// partial write.
    pub fn write<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = tmp_path_for(path);
        {
            let file = File::create(&tmp_path).map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, value).map_err(|source| StoreError::Json {
                path: tmp_path.clone(),
                source,
            })?;
            let file = writer.into_inner().map_err(|e| StoreError::Io {
                path: tmp_path.clone(),
                source: e.into_error(),
            })?;
            file.sync_all().map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        }

        fs::rename(&tmp_path, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(path.to_path_buf())
            } else {
                StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn exists(path: &Path) -> bool {
        path.is_file()
    }

    /// Scan `tasks_dir(team)` for files matching `^\d+\.json$`, returning
    /// `max(existing ids) + 1`, or `1` when the directory is empty or
    /// absent (§4.1 `nextTaskId`).
    pub fn next_task_id(&self, team: &str) -> Result<u64, StoreError> {
        let dir = self.tasks_dir(team);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
            Err(source) => {
                return Err(StoreError::Io {
                    path: dir,
                    source,
                })
            }
        };

        let max_id = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| parse_task_id(&e.file_name().to_string_lossy()))
            .max();

        Ok(max_id.map(|m| m + 1).unwrap_or(1))
    }

    /// 128-bit random id rendered as five hyphen-separated hex groups.
    pub fn new_opaque_id() -> String {
        RandomIdGen.next()
    }
}

fn parse_task_id(file_name: &str) -> Option<u64> {
    let stem = file_name.strip_suffix(".json")?;
    stem.parse::<u64>().ok()
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
