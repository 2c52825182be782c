// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification pipeline — §4.8. The drop-file schema
//! ([`codes_core::TaskNotification`]) is written by the daemon's
//! reporting step (`crate::reporting`); the rest of this module — the
//! singleton watcher, the bounded pending queue, piggyback drain, and
//! blocking subscribe — is the part of the pipeline the spec says
//! "lives in the control-plane server". We specify it as a
//! transport-agnostic library the (out-of-scope) control-plane server
//! would embed, not as a JSON-RPC service of its own.

pub use codes_core::TaskNotification;
use codes_storage::{Store, StoreError};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub use codes_core::NotificationStatus;

/// Cap on the pending-notification queue (§4.8: "excess silently
/// dropped").
pub const QUEUE_CAP: usize = 100;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(90);
pub const DEFAULT_SWEEP_AGE: Duration = Duration::from_secs(120);
pub const DEFAULT_SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Writes `{home}/.codes/notifications/{team}__{taskId}.json`.
pub fn write_notification(store: &Store, notification: &TaskNotification) -> Result<(), StoreError> {
    Store::write(&store.notification_path(&notification.team, notification.task_id), notification)
}

struct Entry {
    notification: TaskNotification,
    file_name: String,
    queued_at: Instant,
}

/// Outcome of a [`NotificationPipeline::subscribe`] call.
pub enum SubscribeOutcome {
    Matched(Vec<TaskNotification>),
    TimedOut { team: String },
}

/// The process-wide watcher + bounded queue (§9 "global process-wide
/// state": "the notification pipeline's queue + watcher-started flag").
/// `new` returns an `Arc` because the background watcher task and every
/// caller of `drain`/`subscribe` share one instance.
pub struct NotificationPipeline {
    store: Arc<Store>,
    queue: Mutex<VecDeque<Entry>>,
    seen: Mutex<HashSet<String>>,
    started: AtomicBool,
    poll_interval: Duration,
    sweep_interval: Duration,
    sweep_age: Duration,
}

impl NotificationPipeline {
    pub fn new(store: Arc<Store>) -> Arc<Self> {
        Self::with_intervals(
            store,
            DEFAULT_POLL_INTERVAL,
            DEFAULT_SWEEP_INTERVAL,
            DEFAULT_SWEEP_AGE,
        )
    }

    /// Test/operator hook for faster polling than the 3s/90s defaults.
    pub fn with_intervals(
        store: Arc<Store>,
        poll_interval: Duration,
        sweep_interval: Duration,
        sweep_age: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            queue: Mutex::new(VecDeque::new()),
            seen: Mutex::new(HashSet::new()),
            started: AtomicBool::new(false),
            poll_interval,
            sweep_interval,
            sweep_age,
        })
    }

    /// Starts the background poll loop at most once. Double-checked via
    /// `compare_exchange` so concurrent first-callers only spawn one
    /// watcher task (§9 "the watcher is started at most once").
    pub fn ensure_started(self: &Arc<Self>) {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let pipeline = Arc::clone(self);
            tokio::spawn(async move { pipeline.watch_loop().await });
        }
    }

    async fn watch_loop(self: Arc<Self>) {
        info!("notification watcher started");
        let mut last_sweep = Instant::now();
        loop {
            if let Err(e) = self.poll_dir() {
                warn!(error = %e, "notification watcher poll failed");
            }
            if last_sweep.elapsed() >= self.sweep_interval {
                self.sweep();
                last_sweep = Instant::now();
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Reads every new file under the notifications directory, skipping
    /// filenames already queued this process (§5 "the watcher
    /// deduplicates by filename within a single server process").
    fn poll_dir(&self) -> io::Result<()> {
        let dir = self.store.notifications_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if !file_name.ends_with(".json") {
                continue;
            }
            if self.seen.lock().contains(&file_name) {
                continue;
            }
            let notification: TaskNotification = match Store::read(&entry.path()) {
                Ok(n) => n,
                Err(_) => continue,
            };
            self.seen.lock().insert(file_name.clone());

            let mut queue = self.queue.lock();
            if queue.len() >= QUEUE_CAP {
                warn!(file = %file_name, "pending-notification queue full, dropping");
                continue;
            }
            queue.push_back(Entry {
                notification,
                file_name,
                queued_at: Instant::now(),
            });
        }
        Ok(())
    }

    /// Atomically returns and clears the whole queue; files are left on
    /// disk for `subscribe` to eventually claim (§4.8 "Piggyback
    /// drain").
    pub fn drain(&self) -> Vec<TaskNotification> {
        self.queue.lock().drain(..).map(|e| e.notification).collect()
    }

    /// Blocks (polling every 100ms) until the queue holds at least one
    /// entry for `team`, or `timeout` elapses. Matching entries are
    /// removed from the queue and from disk; non-matching entries are
    /// left in the queue for the next caller (§4.8 "Blocking subscribe").
    pub async fn subscribe(&self, team: &str, timeout: Duration) -> SubscribeOutcome {
        let deadline = Instant::now() + timeout;
        loop {
            let matched = self.take_matching(team);
            if !matched.is_empty() {
                for (file_name, _) in &matched {
                    let _ = std::fs::remove_file(self.store.notifications_dir().join(file_name));
                }
                return SubscribeOutcome::Matched(matched.into_iter().map(|(_, n)| n).collect());
            }
            if Instant::now() >= deadline {
                return SubscribeOutcome::TimedOut { team: team.to_string() };
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    fn take_matching(&self, team: &str) -> Vec<(String, TaskNotification)> {
        let mut queue = self.queue.lock();
        let mut matched = Vec::new();
        let mut remaining = VecDeque::with_capacity(queue.len());
        for entry in queue.drain(..) {
            if entry.notification.team == team {
                matched.push((entry.file_name, entry.notification));
            } else {
                remaining.push_back(entry);
            }
        }
        *queue = remaining;
        matched
    }

    /// Every ~90s, garbage-collects queued files older than 2 minutes
    /// that no consumer has claimed yet (§4.8 "safety net").
    fn sweep(&self) {
        let mut queue = self.queue.lock();
        let sweep_age = self.sweep_age;
        let store = &self.store;
        let mut swept = 0;
        queue.retain(|entry| {
            if entry.queued_at.elapsed() >= sweep_age {
                let _ = std::fs::remove_file(store.notifications_dir().join(&entry.file_name));
                swept += 1;
                false
            } else {
                true
            }
        });
        if swept > 0 {
            warn!(count = swept, "swept stale unclaimed notifications");
        }
    }
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
