// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! codesd — the multi-agent orchestration core's daemon binary.
//!
//! Two subcommands:
//! - `agent run <team> <member>`: runs one [`codes_daemon::Daemon`] poll
//!   loop to completion (§6 "Daemon subprocess contract"). This is what
//!   a supervisor re-execs itself as.
//! - `supervisor run <team>`: loads the team's roster and supervises one
//!   daemon subprocess per member (§4.7), restarting crashed ones with
//!   backoff until told to stop.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::Path;
use std::sync::Arc;

use codes_adapters::{CliRunner, HookSink, OutputSink, RunnerRegistry, WebhookSink};
use codes_core::SystemClock;
use codes_daemon::{base_dir, log_path, BackoffPolicy, Daemon, DaemonConfig, Supervisor};
use codes_storage::Store;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

fn print_help() {
    println!("codesd {}", env!("CARGO_PKG_VERSION"));
    println!("The daemon process behind the multi-agent orchestration core.");
    println!();
    println!("USAGE:");
    println!("    codesd agent run <team> <member>");
    println!("    codesd supervisor run <team>");
    println!();
    println!("codesd is normally spawned by the `codes` CLI and should not be");
    println!("invoked directly.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("--version") | Some("-V") | Some("-v") => {
            println!("codesd {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Some("--help") | Some("-h") | Some("help") => {
            print_help();
            return Ok(());
        }
        Some("agent") if args.get(1).map(String::as_str) == Some("run") => {
            let (Some(team), Some(member)) = (args.get(2), args.get(3)) else {
                eprintln!("usage: codesd agent run <team> <member>");
                std::process::exit(1);
            };
            run_agent(team, member).await
        }
        Some("supervisor") if args.get(1).map(String::as_str) == Some("run") => {
            let Some(team) = args.get(2) else {
                eprintln!("usage: codesd supervisor run <team>");
                std::process::exit(1);
            };
            run_supervisor(team).await
        }
        _ => {
            eprintln!("error: unexpected arguments");
            print_help();
            std::process::exit(1);
        }
    }
}

async fn run_agent(team: &str, member: &str) -> Result<(), Box<dyn std::error::Error>> {
    let base = base_dir()?;
    let _log_guard = setup_logging(&log_path(&base))?;
    info!(team, member, "agent subprocess starting");

    let store = Store::new(&base);
    let registry = Arc::new(build_runner_registry());
    let sinks = build_sinks();
    let work_dir = std::env::current_dir().unwrap_or_else(|_| base.clone());

    let config = DaemonConfig::new(team, member, work_dir);
    let daemon = Daemon::start(
        config,
        store,
        Arc::new(SystemClock),
        registry,
        sinks,
        Arc::new(codes_daemon::NoProjectResolver),
    )?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        let _ = shutdown_tx.send(true);
    });

    let reason = daemon.run(shutdown_rx).await;
    info!(team, member, ?reason, "agent subprocess exiting");
    Ok(())
}

async fn run_supervisor(team: &str) -> Result<(), Box<dyn std::error::Error>> {
    let base = base_dir()?;
    let _log_guard = setup_logging(&log_path(&base))?;
    info!(team, "supervisor starting");

    let store = Store::new(&base);
    let members: Vec<String> = codes_storage::TeamRepo::new(&store)
        .get(team)?
        .members
        .into_iter()
        .map(|m| m.name)
        .collect();

    let supervisor = Arc::new(Supervisor::new(Store::new(&base), Arc::new(SystemClock), BackoffPolicy::default())?);
    supervisor.reconcile();
    for member in &members {
        supervisor.spawn(team.to_string(), member.clone());
    }

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }

    for member in &members {
        supervisor.stop(team, member);
    }
    info!(team, "supervisor stopped");
    Ok(())
}

fn build_runner_registry() -> RunnerRegistry {
    let registry = RunnerRegistry::new();
    let binary = std::env::var("CODES_RUNNER_CMD").unwrap_or_else(|_| "claude".to_string());
    registry.register(Arc::new(CliRunner::new("cli", binary)));
    registry.set_canonical("cli");
    registry
}

fn build_sinks() -> Vec<Arc<dyn OutputSink>> {
    let mut sinks: Vec<Arc<dyn OutputSink>> = Vec::new();
    sinks.push(Arc::new(codes_adapters::DesktopSink::new()));
    if let Ok(url) = std::env::var("CODES_WEBHOOK_URL") {
        sinks.push(Arc::new(WebhookSink::new(url)));
    }
    if let Ok(script) = std::env::var("CODES_OUTPUT_HOOK") {
        sinks.push(Arc::new(HookSink::new(script)));
    }
    sinks
}

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`] (grounds the
/// teacher's `rotate_log_if_needed`, simplified to a single `.1` rotation).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

fn rotate_log_if_needed(path: &Path) {
    let Ok(meta) = std::fs::metadata(path) else { return };
    if meta.len() < MAX_LOG_SIZE {
        return;
    }
    let _ = std::fs::rename(path, path.with_extension("log.1"));
}

fn setup_logging(path: &Path) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    rotate_log_if_needed(path);
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;
    let file_name = path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("daemon.log"));

    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();

    Ok(guard)
}
