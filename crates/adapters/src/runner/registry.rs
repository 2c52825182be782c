// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner registry — §4.5 "Registry". A process-wide mapping from name
//! to adapter would work equally well behind a lazily-initialized
//! static (§9 design notes); this implementation instead takes the
//! explicit-context alternative the spec calls out as semantically
//! equivalent, since it composes more easily with per-test fixtures.

use super::{Runner, RunnerError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct RunnerRegistry {
    runners: RwLock<HashMap<String, Arc<dyn Runner>>>,
    /// Preferred name for [`RunnerRegistry::default_runner`] when
    /// available; falls back to the first available registrant.
    canonical: RwLock<Option<String>>,
}

impl RunnerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, runner: Arc<dyn Runner>) {
        self.runners.write().insert(runner.name().to_string(), runner);
    }

    pub fn set_canonical(&self, name: impl Into<String>) {
        *self.canonical.write() = Some(name.into());
    }

    /// Fails if `name` was never registered or reports itself
    /// unavailable.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Runner>, RunnerError> {
        let runner = self
            .runners
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RunnerError::Unavailable(name.to_string()))?;
        if !runner.available() {
            return Err(RunnerError::Unavailable(name.to_string()));
        }
        Ok(runner)
    }

    /// Prefers the canonical adapter if set and available, else the
    /// first available registrant in registration order is not
    /// guaranteed — iteration order over a `HashMap` is arbitrary, so
    /// callers needing a deterministic default should set one.
    pub fn default_runner(&self) -> Result<Arc<dyn Runner>, RunnerError> {
        if let Some(name) = self.canonical.read().clone() {
            if let Ok(runner) = self.get(&name) {
                return Ok(runner);
            }
        }
        self.runners
            .read()
            .values()
            .find(|r| r.available())
            .cloned()
            .ok_or_else(|| RunnerError::Unavailable("<none registered>".to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        self.runners.read().keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
