// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process exclusive advisory lock — §4.2.
//!
//! Backed by `fs2`'s `flock(2)` (POSIX) / `LockFileEx` (Windows) wrapper,
//! the same crate the teacher's daemon lifecycle uses to hold its PID
//! file lock. The lock file carries no data and may be left on disk
//! between acquisitions.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// A held exclusive lock on `path`. Releases on `drop` (all exit paths:
/// success, error return, or an unwinding panic), so callers never need
/// to remember to unlock explicitly.
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until an exclusive lock on `path` is held, creating the
    /// lock file (and its parent directory) if necessary.
    pub fn acquire(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        file.lock_exclusive()?;
        Ok(Self { file, path })
    }

    /// Try to acquire without blocking; `Ok(None)` means another process
    /// (or another in-process holder) currently holds it.
    pub fn try_acquire(path: impl Into<PathBuf>) -> io::Result<Option<Self>> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file, path })),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Explicit release; equivalent to dropping the guard, but lets
    /// callers surface an unlock error if they want to.
    pub fn release(self) -> io::Result<()> {
        FileExt::unlock(&self.file)
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
#[path = "file_lock_tests.rs"]
mod tests;
