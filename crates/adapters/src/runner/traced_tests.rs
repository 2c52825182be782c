// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::runner::FakeRunner;
use codes_core::RunConfig;

#[tokio::test]
async fn delegates_run_and_preserves_result() {
    let fake = FakeRunner::new("codex");
    let traced = TracedRunner::new(fake.clone());

    let config = RunConfig::new("hi", "/work");
    let result = traced.run(&config).await.unwrap();
    assert!(!result.is_error());
    assert_eq!(fake.calls().len(), 1);
}

#[test]
fn delegates_name_available_and_capabilities() {
    let fake = FakeRunner::new("codex").with_capabilities(codes_core::AdapterCapabilities {
        model_selection: true,
        ..Default::default()
    });
    let traced = TracedRunner::new(fake);

    assert_eq!(traced.name(), "codex");
    assert!(traced.available());
    assert!(traced.capabilities().model_selection);
}
