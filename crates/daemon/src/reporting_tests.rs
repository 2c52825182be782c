use super::*;
use codes_adapters::FakeSink;
use codes_core::test_support::fixed_time;
use codes_core::{FakeClock, Priority};
use codes_storage::Store;
use tempfile::tempdir;

fn task_with_id(id: u64) -> Task {
    let mut task = Task::new(id, "echo hi", "w", fixed_time());
    task.priority = Priority::Normal;
    task
}

#[tokio::test]
async fn completed_report_broadcasts_writes_notification_and_pushes_sinks() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let fake_sink = FakeSink::new();
    let sinks: Vec<Arc<dyn OutputSink>> = vec![Arc::new(fake_sink.clone())];

    let reporter = Reporter {
        store: &store,
        clock: &clock,
        sinks: &sinks,
    };
    let task = task_with_id(1);
    reporter
        .report("alpha", "w", &task, ReportOutcome::Completed { result: "hi".to_string() })
        .await;

    let messages = MessageRepo::new(&store).get_all_for_team("alpha", 10).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, MessageType::TaskCompleted);
    assert!(messages[0].content.contains("hi"));

    let notification: TaskNotification = codes_storage::Store::read(&store.notification_path("alpha", 1)).unwrap();
    assert!(matches!(notification.status, NotificationStatus::Completed));

    assert_eq!(fake_sink.calls().len(), 1);
}

#[tokio::test]
async fn failed_report_swallows_a_failing_sink() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = FakeClock::default();
    let failing = FakeSink::new();
    failing.fail_next("boom");
    let sinks: Vec<Arc<dyn OutputSink>> = vec![Arc::new(failing)];

    let reporter = Reporter {
        store: &store,
        clock: &clock,
        sinks: &sinks,
    };
    let task = task_with_id(2);
    // Must not panic even though the sink fails.
    reporter
        .report("beta", "w", &task, ReportOutcome::Failed { error: "boom".to_string() })
        .await;

    let notification: TaskNotification = codes_storage::Store::read(&store.notification_path("beta", 2)).unwrap();
    assert!(matches!(notification.status, NotificationStatus::Failed));
}

#[test]
fn truncate_stops_at_the_char_boundary_limit() {
    let long = "x".repeat(600);
    assert_eq!(truncate(&long).len(), REPORT_TRUNCATE_LEN);
}

#[test]
fn chat_reply_falls_back_to_placeholder_on_empty_result() {
    assert_eq!(chat_reply(""), "(no response generated)");
    assert_eq!(chat_reply("hi"), "hi");
}

#[test]
fn error_reply_prefixes_the_detail() {
    assert_eq!(error_reply("boom"), "[error] boom");
}
