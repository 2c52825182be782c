// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell-hook sink — runs a configured script, piping the notification
//! JSON to its standard input (§6 "Shell hook contract").

use super::{OutputSink, SinkError, SinkEvent};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use std::process::Stdio;
use tokio::process::Command;

const HOOK_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HookSink {
    script_path: String,
}

impl HookSink {
    pub fn new(script_path: impl Into<String>) -> Self {
        Self {
            script_path: script_path.into(),
        }
    }
}

#[async_trait]
impl OutputSink for HookSink {
    fn name(&self) -> &'static str {
        "hook"
    }

    async fn send(&self, event: &SinkEvent) -> Result<(), SinkError> {
        let payload = serde_json::to_vec(&event.notification)
            .map_err(|e| SinkError::SendFailed(format!("encoding notification: {e}")))?;

        let run = async {
            let mut child = Command::new(&self.script_path)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| format!("output hook failed to start: {e}"))?;

            let mut stdin = child.stdin.take().expect("stdin was piped");
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| format!("writing notification to hook stdin: {e}"))?;
            drop(stdin);

            child
                .wait_with_output()
                .await
                .map_err(|e| format!("output hook failed: {e}"))
        };

        let output = match tokio::time::timeout(HOOK_TIMEOUT, run).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(SinkError::SendFailed(e)),
            Err(_elapsed) => {
                return Err(SinkError::SendFailed(format!(
                    "output hook timed out after {}s",
                    HOOK_TIMEOUT.as_secs()
                )))
            }
        };

        if !output.status.success() {
            return Err(SinkError::SendFailed(format!(
                "hook exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
