// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP callback sink — POSTs to a per-task `callbackURL` rather than a
//! fixed configured endpoint (contrast [`super::WebhookSink`]). Not an
//! [`super::OutputSink`]: the reporter holds the `Task`/outcome directly
//! and has a full [`TaskNotification`] to hand it, so there is no need
//! to round-trip through the flattened [`super::SinkEvent`] shape the
//! generic sinks share.

use super::SinkError;
use codes_core::TaskNotification;
use std::time::Duration;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the destination URL per-event instead of at construction
/// time, since each task may carry its own `callbackURL`.
pub struct CallbackSink {
    url: String,
    client: reqwest::Client,
}

impl CallbackSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(CALLBACK_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn name(&self) -> &'static str {
        "callback"
    }

    /// POSTs the notification JSON (§6 "Outbound callback") to
    /// `self.url`. The response body is consumed and discarded; only
    /// the status matters.
    pub async fn send(&self, notification: &TaskNotification) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| SinkError::SendFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SinkError::SendFailed(format!("callback returned {}", response.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
