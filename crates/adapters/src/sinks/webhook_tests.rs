// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use codes_core::{NotificationStatus, TaskNotification};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event() -> SinkEvent {
    SinkEvent {
        team: "alpha".to_string(),
        task_id: 7,
        title: "task completed".to_string(),
        body: "all good".to_string(),
        notification: TaskNotification {
            team: "alpha".to_string(),
            task_id: 7,
            subject: "task completed".to_string(),
            status: NotificationStatus::Completed,
            agent: "w".to_string(),
            result: Some("all good".to_string()),
            error: None,
            timestamp: Utc::now(),
        },
    }
}

#[tokio::test]
async fn posts_json_payload_to_configured_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hooks/oddjobs"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sink = WebhookSink::new(format!("{}/hooks/oddjobs", server.uri()));
    sink.send(&event()).await.unwrap();
}

#[tokio::test]
async fn non_2xx_response_is_a_send_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sink = WebhookSink::new(server.uri());
    let err = sink.send(&event()).await.unwrap_err();
    assert!(matches!(err, SinkError::SendFailed(_)));
}

#[tokio::test]
async fn unreachable_url_is_a_send_failure() {
    let sink = WebhookSink::new("http://127.0.0.1:1");
    let err = sink.send(&event()).await.unwrap_err();
    assert!(matches!(err, SinkError::SendFailed(_)));
}
