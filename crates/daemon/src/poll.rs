// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon poll loop — §4.6. One `Daemon` owns exactly one (team,
//! member) pair: it scans messages, claims and executes tasks, detects
//! external cancellation, and drains cleanly on shutdown or a `__stop__`
//! message.

use crate::process::current_executable;
use crate::project::ProjectResolver;
use crate::reporting::{chat_prompt, chat_reply, error_reply, task_system_prompt, ReportOutcome, Reporter};
use codes_adapters::{OutputSink, RunnerRegistry};
use codes_core::message::STOP_SENTINEL;
use codes_core::{AgentState, Clock, MessageType, RunConfig, Task, TaskStatus};
use codes_storage::{AgentStateRepo, MessageRepo, Store, TaskRepo};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// How the poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    StopMessage,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub team: String,
    pub member: String,
    pub role: String,
    pub default_work_dir: PathBuf,
    pub poll_interval: Duration,
}

impl DaemonConfig {
    pub fn new(team: impl Into<String>, member: impl Into<String>, default_work_dir: impl Into<PathBuf>) -> Self {
        Self {
            team: team.into(),
            member: member.into(),
            role: "general-purpose worker".to_string(),
            default_work_dir: default_work_dir.into(),
            poll_interval: crate::config::DEFAULT_POLL_INTERVAL,
        }
    }
}

struct WorkerOutcome {
    result_text: String,
    error_text: String,
    session_id: Option<String>,
}

struct InFlight {
    task_id: u64,
    handle: JoinHandle<()>,
    completion_rx: oneshot::Receiver<WorkerOutcome>,
}

/// Owns one (team, member) pair's agent-state record and poll loop.
pub struct Daemon {
    config: DaemonConfig,
    store: Store,
    clock: Arc<dyn Clock>,
    runners: Arc<RunnerRegistry>,
    sinks: Vec<Arc<dyn OutputSink>>,
    project_resolver: Arc<dyn ProjectResolver>,
    agent_state: AgentState,
    last_message_session_id: Option<String>,
    in_flight: Option<InFlight>,
}

impl Daemon {
    /// Creates the agent-state record (pid, fresh session id, status
    /// idle) and broadcasts "online" (§4.6 "Start sequence").
    pub fn start(
        config: DaemonConfig,
        store: Store,
        clock: Arc<dyn Clock>,
        runners: Arc<RunnerRegistry>,
        sinks: Vec<Arc<dyn OutputSink>>,
        project_resolver: Arc<dyn ProjectResolver>,
    ) -> Result<Self, DaemonError> {
        let now = clock.now();
        let mut agent_state = AgentState::new(config.member.clone(), config.team.clone(), std::process::id() as i32, now);
        agent_state.session_id = Some(Store::new_opaque_id());

        AgentStateRepo::new(&store)
            .save(&mut agent_state, clock.as_ref())
            .map_err(|e| DaemonError::Storage(e.to_string()))?;

        let mut daemon = Self {
            config,
            store,
            clock,
            runners,
            sinks,
            project_resolver,
            agent_state,
            last_message_session_id: None,
            in_flight: None,
        };
        daemon.broadcast_presence("online");
        info!(team = %daemon.config.team, member = %daemon.config.member, "daemon started");
        Ok(daemon)
    }

    /// Runs the poll loop until shutdown is signalled or a `__stop__`
    /// message arrives for this member (§4.6 "Poll loop").
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> StopReason {
        let reason = loop {
            if *shutdown.borrow() {
                break StopReason::Shutdown;
            }
            if self.scan_for_stop_sentinel() {
                break StopReason::StopMessage;
            }

            if self.in_flight.is_some() {
                self.reap_or_check_cancellation().await;
            } else {
                self.process_messages().await;
                self.pick_up_task().await;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = shutdown.changed() => {}
            }
        };

        self.drain_in_flight().await;
        self.stop();
        reason
    }

    fn stop(&mut self) {
        self.agent_state.status = codes_core::AgentStatus::Stopped;
        self.save_agent_state();
        self.broadcast_presence("offline");
        info!(team = %self.config.team, member = %self.config.member, "daemon stopped");
    }

    fn save_agent_state(&mut self) {
        if let Err(e) = AgentStateRepo::new(&self.store).save(&mut self.agent_state, self.clock.as_ref()) {
            warn!(error = %e, "failed to persist agent state");
        }
    }

    fn broadcast_presence(&self, text: &str) {
        let suffix = codes_core::id::RandomIdGen::short_hex(8);
        if let Err(e) = MessageRepo::new(&self.store).broadcast(
            &self.config.team,
            MessageType::System,
            &self.config.member,
            text,
            &suffix,
            self.clock.as_ref(),
        ) {
            warn!(error = %e, "failed to broadcast presence");
        }
    }

    /// §4.6 step 2: leaves a `__stop__` message unread and unacted on
    /// (processing skips it too) until this check sees it.
    fn scan_for_stop_sentinel(&self) -> bool {
        let Ok(messages) = MessageRepo::new(&self.store).get_for(&self.config.team, &self.config.member, true) else {
            return false;
        };
        for message in messages {
            if message.content == STOP_SENTINEL {
                let _ = MessageRepo::new(&self.store).mark_read(&self.config.team, &message.id);
                return true;
            }
        }
        false
    }

    /// §4.6.1 "Message processing policy".
    async fn process_messages(&mut self) {
        let messages = match MessageRepo::new(&self.store).get_for(&self.config.team, &self.config.member, true) {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "failed to read unread messages");
                return;
            }
        };

        for message in messages {
            if message.sender == self.config.member {
                let _ = MessageRepo::new(&self.store).mark_read(&self.config.team, &message.id);
                continue;
            }
            if message.content == STOP_SENTINEL {
                continue; // handled by scan_for_stop_sentinel next tick
            }
            if message.message_type.is_informational() {
                let _ = MessageRepo::new(&self.store).mark_read(&self.config.team, &message.id);
                continue;
            }
            if message.is_broadcast() {
                info!(from = %message.sender, "broadcast received, not replying");
                let _ = MessageRepo::new(&self.store).mark_read(&self.config.team, &message.id);
                continue;
            }

            let _ = MessageRepo::new(&self.store).mark_read(&self.config.team, &message.id);
            self.set_activity(format!("replying to {}", message.sender));

            let Ok(runner) = self.runners.default_runner() else {
                warn!("no runner available to answer direct message");
                continue;
            };
            let mut config = RunConfig::new(chat_prompt(&message.sender, &message.content), &self.config.default_work_dir);
            if let Some(session_id) = &self.last_message_session_id {
                config.session_id = Some(session_id.clone());
                config.resume = true;
            }

            let reply = match runner.run(&config).await {
                Ok(result) if result.is_error() => error_reply(&result.error_text),
                Ok(result) => {
                    if let Some(session_id) = result.session_id {
                        self.last_message_session_id = Some(session_id);
                    }
                    chat_reply(&result.result_text).to_string()
                }
                Err(e) => error_reply(&e.to_string()),
            };

            let suffix = codes_core::id::RandomIdGen::short_hex(8);
            if let Err(e) = MessageRepo::new(&self.store).send(
                &self.config.team,
                MessageType::Chat,
                &self.config.member,
                &message.sender,
                &reply,
                None,
                &suffix,
                self.clock.as_ref(),
            ) {
                warn!(error = %e, "failed to send chat reply");
            }
            self.set_activity("idle");
        }
    }

    /// §4.6.2 "Task pickup": assigned-to-self first, then claim an
    /// unowned pending task.
    async fn pick_up_task(&mut self) {
        let task_repo = TaskRepo::new(&self.store);

        let assigned = match task_repo.list(&self.config.team, Some(TaskStatus::Assigned), Some(&self.config.member)) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "failed to list assigned tasks");
                Vec::new()
            }
        };
        if let Some(task) = assigned.into_iter().find(|t| !task_repo.is_blocked(&self.config.team, t)) {
            self.start_task(task).await;
            return;
        }

        let pending = match task_repo.list(&self.config.team, Some(TaskStatus::Pending), Some("")) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "failed to list pending tasks");
                Vec::new()
            }
        };
        for candidate in pending {
            if task_repo.is_blocked(&self.config.team, &candidate) {
                continue;
            }
            let member = self.config.member.clone();
            let now = self.clock.now();
            let claim = task_repo.update(&self.config.team, candidate.id, move |t| {
                if t.owner.is_empty() && t.status == TaskStatus::Pending {
                    t.assign(member, now)
                } else {
                    Err(codes_core::TaskError::ClaimLost)
                }
            });
            match claim {
                Ok(claimed) => {
                    self.start_task(claimed).await;
                    return;
                }
                Err(_) => continue, // race loss, try the next candidate
            }
        }
    }

    /// §4.6.3 "Asynchronous task execution": transitions to running,
    /// updates agent state, spawns exactly one worker.
    async fn start_task(&mut self, task: Task) {
        let now = self.clock.now();
        let task = match TaskRepo::new(&self.store).update(&self.config.team, task.id, move |t| t.start(now)) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, task_id = task.id, "failed to start claimed task");
                return;
            }
        };

        self.agent_state.begin_task(task.id, task.subject.clone(), self.clock.now());
        self.save_agent_state();

        let runners = Arc::clone(&self.runners);
        let project_resolver = Arc::clone(&self.project_resolver);
        let team = self.config.team.clone();
        let member = self.config.member.clone();
        let role = self.config.role.clone();
        let default_work_dir = self.config.default_work_dir.clone();
        let prompt = task.description.clone().unwrap_or_else(|| task.subject.clone());
        let adapter_name = task.adapter.clone();
        let session_id = task.session_id.clone();
        let project = task.project.clone();
        let explicit_work_dir = task.work_dir.clone();
        let task_id = task.id;

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let work_dir = explicit_work_dir
                .map(PathBuf::from)
                .or_else(|| {
                    project.as_deref().and_then(|p| {
                        let resolved = project_resolver.resolve(p);
                        if resolved.is_none() {
                            warn!(project = p, "project did not resolve, falling back to default work dir");
                        }
                        resolved
                    })
                })
                .unwrap_or(default_work_dir);

            let runner = match adapter_name.as_deref() {
                Some(name) => runners.get(name),
                None => runners.default_runner(),
            };
            let runner = match runner {
                Ok(r) => r,
                Err(e) => {
                    let _ = tx.send(WorkerOutcome {
                        result_text: String::new(),
                        error_text: e.to_string(),
                        session_id: None,
                    });
                    return;
                }
            };

            let system_prompt =
                task_system_prompt(&member, &team, &role, &work_dir.display().to_string(), project.as_deref());
            let mut config = RunConfig::new(prompt, work_dir);
            config.session_id = session_id;
            config.resume = config.session_id.is_some();
            config.system_prompt = Some(system_prompt);

            let outcome = match runner.run(&config).await {
                Ok(result) => WorkerOutcome {
                    result_text: result.result_text,
                    error_text: result.error_text,
                    session_id: result.session_id,
                },
                Err(e) => WorkerOutcome {
                    result_text: String::new(),
                    error_text: e.to_string(),
                    session_id: None,
                },
            };
            let _ = tx.send(outcome);
        });

        self.in_flight = Some(InFlight {
            task_id,
            handle,
            completion_rx: rx,
        });
    }

    /// Non-blocking poll of the in-flight completion channel (§4.6 step
    /// 3) plus the external-cancellation check (§4.6.4) when it's still
    /// running.
    async fn reap_or_check_cancellation(&mut self) {
        let Some(in_flight) = self.in_flight.as_mut() else { return };
        match in_flight.completion_rx.try_recv() {
            Ok(outcome) => {
                let task_id = in_flight.task_id;
                self.in_flight = None;
                self.finish_task(task_id, Some(outcome)).await;
            }
            Err(oneshot::error::TryRecvError::Empty) => {
                self.check_external_cancellation().await;
            }
            Err(oneshot::error::TryRecvError::Closed) => {
                let task_id = in_flight.task_id;
                self.in_flight = None;
                self.finish_task(task_id, None).await;
            }
        }
    }

    /// §4.6.4: if another process has written `status=cancelled` onto
    /// the in-flight task, cancel the subcontext — aborting the worker
    /// task drops its in-flight `Command::output()` future, which
    /// (thanks to `kill_on_drop`) terminates the subprocess.
    async fn check_external_cancellation(&mut self) {
        let Some(in_flight) = &self.in_flight else { return };
        let task_id = in_flight.task_id;
        let Ok(task) = TaskRepo::new(&self.store).get(&self.config.team, task_id) else {
            return;
        };
        if task.status == TaskStatus::Cancelled {
            if let Some(in_flight) = self.in_flight.take() {
                in_flight.handle.abort();
            }
            self.finish_task(task_id, None).await;
        }
    }

    /// §4.6.3 "Reaping a completed task".
    async fn finish_task(&mut self, task_id: u64, outcome: Option<WorkerOutcome>) {
        let task_repo = TaskRepo::new(&self.store);
        let Ok(task) = task_repo.get(&self.config.team, task_id) else {
            self.agent_state.finish_task(self.clock.now());
            self.save_agent_state();
            return;
        };

        let reporter = Reporter {
            store: &self.store,
            clock: self.clock.as_ref(),
            sinks: &self.sinks,
        };

        if task.status == TaskStatus::Cancelled {
            let partial = outcome.as_ref().filter(|o| !o.result_text.is_empty()).map(|o| format!("(cancelled) {}", o.result_text));
            if let Some(text) = &partial {
                let _ = task_repo.update(&self.config.team, task_id, {
                    let text = text.clone();
                    let now = self.clock.now();
                    move |t| {
                        t.result = text;
                        t.updated_at = now;
                        Ok(())
                    }
                });
            }
            reporter
                .report(
                    &self.config.team,
                    &self.config.member,
                    &task,
                    ReportOutcome::Cancelled { partial_result: partial },
                )
                .await;
        } else {
            match outcome {
                None => {
                    let failed = task_repo.fail(&self.config.team, task_id, "runner task terminated unexpectedly", self.clock.as_ref());
                    if let Ok(failed) = failed {
                        reporter
                            .report(
                                &self.config.team,
                                &self.config.member,
                                &failed,
                                ReportOutcome::Failed { error: "runner task terminated unexpectedly".to_string() },
                            )
                            .await;
                    }
                }
                Some(outcome) if !outcome.error_text.is_empty() => {
                    if let Ok(failed) = task_repo.fail(&self.config.team, task_id, &outcome.error_text, self.clock.as_ref()) {
                        reporter
                            .report(&self.config.team, &self.config.member, &failed, ReportOutcome::Failed { error: outcome.error_text })
                            .await;
                    }
                }
                Some(outcome) => {
                    if let Some(session_id) = outcome.session_id.clone() {
                        let _ = task_repo.update(&self.config.team, task_id, move |t| {
                            t.session_id = Some(session_id);
                            Ok(())
                        });
                    }
                    if let Ok(completed) = task_repo.complete(&self.config.team, task_id, &outcome.result_text, self.clock.as_ref()) {
                        reporter
                            .report(
                                &self.config.team,
                                &self.config.member,
                                &completed,
                                ReportOutcome::Completed { result: outcome.result_text },
                            )
                            .await;
                    }
                }
            }
        }

        self.agent_state.finish_task(self.clock.now());
        self.save_agent_state();
    }

    /// §4.6.4 "On shutdown": cancel the subcontext, block until the
    /// completion channel delivers (or the abort resolves), then mark a
    /// still-running task failed with reason "agent stopped".
    async fn drain_in_flight(&mut self) {
        let Some(in_flight) = self.in_flight.take() else { return };
        in_flight.handle.abort();
        let _ = in_flight.handle.await;

        if let Ok(task) = TaskRepo::new(&self.store).get(&self.config.team, in_flight.task_id) {
            if task.status == TaskStatus::Running {
                if let Ok(failed) = TaskRepo::new(&self.store).fail(&self.config.team, in_flight.task_id, "agent stopped", self.clock.as_ref())
                {
                    let reporter = Reporter {
                        store: &self.store,
                        clock: self.clock.as_ref(),
                        sinks: &self.sinks,
                    };
                    reporter
                        .report(
                            &self.config.team,
                            &self.config.member,
                            &failed,
                            ReportOutcome::Failed { error: "agent stopped".to_string() },
                        )
                        .await;
                }
            }
        }
    }

    fn set_activity(&mut self, activity: impl Into<String>) {
        self.agent_state.set_activity(activity, self.clock.now());
        self.save_agent_state();
    }
}

/// Used by the supervisor / `codesd` binary to build the argument
/// vector for a re-exec (§6 "Daemon subprocess contract").
pub fn daemon_subprocess_args(team: &str, member: &str) -> Vec<String> {
    vec!["agent".to_string(), "run".to_string(), team.to_string(), member.to_string()]
}

/// Resolves the executable path a supervisor should spawn with
/// [`daemon_subprocess_args`].
pub fn daemon_executable() -> std::io::Result<PathBuf> {
    current_executable()
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
