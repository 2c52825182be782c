// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! codes-daemon: the per-(team, member) poll loop and its supervisor.
//!
//! `Daemon` owns exactly one agent's message/task loop (§4.6);
//! `Supervisor` spawns, restarts, and health-checks `Daemon` subprocesses
//! (§4.7). `notifications` and `reporting` are the library pieces an
//! external control-plane server embeds to surface task outcomes; the
//! server itself is out of scope here.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod notifications;
pub mod poll;
pub mod process;
pub mod project;
pub mod reporting;
pub mod supervisor;

pub use config::{base_dir, log_path, ConfigError, DEFAULT_POLL_INTERVAL};
pub use notifications::{NotificationPipeline, NotificationStatus, SubscribeOutcome, TaskNotification};
pub use poll::{Daemon, DaemonConfig, DaemonError, StopReason};
pub use project::{NoProjectResolver, ProjectResolver};
pub use supervisor::{AgentHealth, BackoffPolicy, Supervisor, SupervisorError};
