// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the on-disk store every command operates against, mirroring
//! `codes_daemon::config::base_dir` so the CLI and the daemon agree on
//! where `teams/` and `notifications/` live.

use codes_core::SystemClock;
use codes_storage::Store;
use std::sync::Arc;

pub struct Context {
    pub store: Store,
    pub clock: Arc<SystemClock>,
}

impl Context {
    pub fn load() -> anyhow::Result<Self> {
        let base = codes_daemon::base_dir()?;
        Ok(Self { store: Store::new(&base), clock: Arc::new(SystemClock) })
    }
}
