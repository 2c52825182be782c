// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use codes_core::NotificationStatus;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn notification() -> TaskNotification {
    TaskNotification {
        team: "alpha".to_string(),
        task_id: 9,
        subject: "task failed".to_string(),
        status: NotificationStatus::Failed,
        agent: "w".to_string(),
        result: None,
        error: Some("boom".to_string()),
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn posts_the_notification_json_to_its_callback_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({ "taskId": 9 })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let sink = CallbackSink::new(server.uri());
    sink.send(&notification()).await.unwrap();
}

#[tokio::test]
async fn server_error_is_a_send_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let sink = CallbackSink::new(server.uri());
    let err = sink.send(&notification()).await.unwrap_err();
    assert!(matches!(err, SinkError::SendFailed(_)));
}
