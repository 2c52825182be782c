// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook sink — POSTs a JSON body to a fixed URL.

use super::{OutputSink, SinkError, SinkEvent};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    team: &'a str,
    task_id: u64,
    title: &'a str,
    body: &'a str,
}

pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OutputSink for WebhookSink {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn send(&self, event: &SinkEvent) -> Result<(), SinkError> {
        let payload = WebhookPayload {
            team: &event.team,
            task_id: event.task_id,
            title: &event.title,
            body: &event.body,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SinkError::SendFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(SinkError::SendFailed(format!("webhook returned {}", response.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
