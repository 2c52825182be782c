use super::*;
use async_trait::async_trait;
use codes_adapters::{FakeRunner, Runner, RunnerError, RunnerRegistry};
use codes_core::test_support::fixed_time;
use codes_core::{AdapterCapabilities, FakeClock, MessageType, RunResult};
use codes_storage::{MessageRepo, TaskRepo};
use std::sync::Arc;
use tempfile::tempdir;

fn fake_clock() -> Arc<dyn Clock> {
    Arc::new(FakeClock::new(fixed_time().timestamp_millis() as u64))
}

fn registry_with_fake(reply: &str) -> Arc<RunnerRegistry> {
    let fake = FakeRunner::new("fake");
    fake.queue_result(Ok(RunResult {
        result_text: reply.to_string(),
        ..Default::default()
    }));
    let registry = RunnerRegistry::new();
    registry.register(Arc::new(fake));
    registry.set_canonical("fake");
    Arc::new(registry)
}

/// A runner whose `run` never resolves, used to exercise the shutdown
/// drain path against a task that's genuinely still in flight.
#[derive(Debug)]
struct HangingRunner;

#[async_trait]
impl Runner for HangingRunner {
    fn name(&self) -> &str {
        "hanging"
    }
    fn available(&self) -> bool {
        true
    }
    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::default()
    }
    async fn run(&self, _config: &codes_core::RunConfig) -> Result<RunResult, RunnerError> {
        std::future::pending().await
    }
}

fn test_daemon(dir: &std::path::Path, runners: Arc<RunnerRegistry>) -> Daemon {
    let store = Store::new(dir);
    let config = DaemonConfig::new("alpha", "w", dir.join("work"));
    Daemon::start(config, store, fake_clock(), runners, Vec::new(), Arc::new(crate::project::NoProjectResolver))
        .expect("daemon starts")
}

#[tokio::test]
async fn start_writes_agent_state_and_broadcasts_online() {
    let dir = tempdir().unwrap();
    let daemon = test_daemon(dir.path(), registry_with_fake("hi"));
    let store = Store::new(dir.path());

    let state = AgentStateRepo::new(&store).get("alpha", "w").unwrap();
    assert!(state.is_some());

    let messages = MessageRepo::new(&store).get_all_for_team("alpha", 10).unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].content.contains("online"));
    drop(daemon);
}

#[tokio::test]
async fn picks_up_a_pending_task_and_completes_it() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = fake_clock();
    TaskRepo::new(&store).create("alpha", "echo hi", "", clock.as_ref()).unwrap();

    let mut daemon = test_daemon(dir.path(), registry_with_fake("done"));
    daemon.pick_up_task().await;
    assert!(daemon.in_flight.is_some());

    for _ in 0..50 {
        if daemon.in_flight.is_none() {
            break;
        }
        daemon.reap_or_check_cancellation().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let task = TaskRepo::new(&store).get("alpha", 1).unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.result, "done");

    let notification: crate::notifications::TaskNotification =
        codes_storage::Store::read(&store.notification_path("alpha", 1)).unwrap();
    assert!(matches!(notification.status, crate::notifications::NotificationStatus::Completed));
}

#[tokio::test]
async fn a_direct_chat_message_gets_a_reply_and_is_marked_read() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = fake_clock();
    MessageRepo::new(&store)
        .send("alpha", MessageType::Chat, "operator", "w", "status?", None, "aaaa1111", clock.as_ref())
        .unwrap();

    let mut daemon = test_daemon(dir.path(), registry_with_fake("all good"));
    daemon.process_messages().await;

    let unread = MessageRepo::new(&store).get_for("alpha", "w", true).unwrap();
    assert!(unread.is_empty());

    let all = MessageRepo::new(&store).get_all_for_team("alpha", 10).unwrap();
    let reply = all.iter().find(|m| m.recipient == "operator").expect("a reply was sent");
    assert_eq!(reply.content, "all good");
}

#[tokio::test]
async fn a_stop_message_is_left_unread_by_message_processing() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = fake_clock();
    MessageRepo::new(&store)
        .send(
            "alpha",
            MessageType::Chat,
            "operator",
            "w",
            codes_core::message::STOP_SENTINEL,
            None,
            "bbbb2222",
            clock.as_ref(),
        )
        .unwrap();

    let mut daemon = test_daemon(dir.path(), registry_with_fake("n/a"));
    daemon.process_messages().await;

    let unread = MessageRepo::new(&store).get_for("alpha", "w", true).unwrap();
    assert_eq!(unread.len(), 1, "the stop message is left for scan_for_stop_sentinel");

    assert!(daemon.scan_for_stop_sentinel());
    let unread = MessageRepo::new(&store).get_for("alpha", "w", true).unwrap();
    assert!(unread.is_empty());
}

#[tokio::test]
async fn drain_in_flight_fails_a_still_running_task_as_agent_stopped() {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let clock = fake_clock();
    TaskRepo::new(&store).create("alpha", "long job", "", clock.as_ref()).unwrap();

    let registry = RunnerRegistry::new();
    registry.register(Arc::new(HangingRunner));
    registry.set_canonical("hanging");

    let mut daemon = test_daemon(dir.path(), Arc::new(registry));
    daemon.pick_up_task().await;
    assert!(daemon.in_flight.is_some());

    daemon.drain_in_flight().await;

    let task = TaskRepo::new(&store).get("alpha", 1).unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error, "agent stopped");
}

#[test]
fn daemon_subprocess_args_matches_the_agent_run_contract() {
    assert_eq!(
        daemon_subprocess_args("alpha", "w"),
        vec!["agent".to_string(), "run".to_string(), "alpha".to_string(), "w".to_string()]
    );
}
