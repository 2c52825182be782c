// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O — §4.5 LLM-runner adapter, §10 output sinks.

pub mod runner;
pub mod sinks;
pub mod subprocess;

pub use runner::{CliRunner, Runner, RunnerError, RunnerRegistry, TracedRunner};
pub use sinks::{CallbackSink, DesktopSink, HookSink, NoOpSink, OutputSink, SinkError, SinkEvent, WebhookSink};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use runner::{FakeRunner, RunnerCall};
#[cfg(any(test, feature = "test-support"))]
pub use sinks::{FakeSink, SinkCall};
