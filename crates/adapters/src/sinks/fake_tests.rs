// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::Utc;
use codes_core::{NotificationStatus, TaskNotification};

fn event(task_id: u64, title: &str) -> SinkEvent {
    SinkEvent {
        team: "alpha".to_string(),
        task_id,
        title: title.to_string(),
        body: "body".to_string(),
        notification: TaskNotification {
            team: "alpha".to_string(),
            task_id,
            subject: title.to_string(),
            status: NotificationStatus::Completed,
            agent: "w".to_string(),
            result: Some("body".to_string()),
            error: None,
            timestamp: Utc::now(),
        },
    }
}

#[tokio::test]
async fn fake_sink_records_calls() {
    let sink = FakeSink::new();

    sink.send(&event(1, "started")).await.unwrap();
    sink.send(&event(2, "completed")).await.unwrap();

    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].title, "started");
    assert_eq!(calls[1].task_id, 2);
}

#[tokio::test]
async fn fake_sink_fails_once_when_armed() {
    let sink = FakeSink::new();
    sink.fail_next("simulated outage");

    let err = sink.send(&event(1, "x")).await.unwrap_err();
    assert!(matches!(err, SinkError::SendFailed(_)));

    assert!(sink.send(&event(1, "x")).await.is_ok());
}
