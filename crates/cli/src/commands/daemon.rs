// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle commands: start/stop a team's agents under a
//! supervisor, check their health, and tail the shared daemon log.

use anyhow::Result;
use clap::{Args, Subcommand};
use codes_daemon::{log_path, BackoffPolicy, Supervisor};
use codes_storage::TeamRepo;
use std::sync::Arc;

use crate::context::Context;
use crate::output::{tail_file, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start supervising every member of a team's roster
    Start {
        team: String,
        /// Run the supervisor inline instead of detaching
        #[arg(long)]
        foreground: bool,
    },
    /// Stop a team's supervised agents
    Stop { team: String },
    /// Show per-member health (alive, restarts, uptime)
    Status { team: String },
    /// Tail the daemon process log
    Logs {
        #[arg(long, short)]
        follow: bool,
    },
}

pub async fn run(args: DaemonArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { team, foreground } => start(ctx, &team, foreground).await,
        DaemonCommand::Stop { team } => stop(ctx, &team),
        DaemonCommand::Status { team } => status(ctx, &team, format),
        DaemonCommand::Logs { follow } => logs(follow).await,
    }
}

fn members_of(ctx: &Context, team: &str) -> Result<Vec<String>> {
    Ok(TeamRepo::new(&ctx.store).get(team)?.members.into_iter().map(|m| m.name).collect())
}

async fn start(ctx: &Context, team: &str, foreground: bool) -> Result<()> {
    let members = members_of(ctx, team)?;
    let supervisor = Arc::new(Supervisor::new(
        codes_storage::Store::new(ctx.store.root()),
        ctx.clock.clone(),
        BackoffPolicy::default(),
    )?);
    supervisor.reconcile();
    for member in &members {
        supervisor.spawn(team.to_string(), member.clone());
    }
    println!("supervising {} member(s) of {team}", members.len());
    if foreground {
        println!("press ctrl-c to stop");
        tokio::signal::ctrl_c().await?;
        for member in &members {
            supervisor.stop(team, member);
        }
    }
    Ok(())
}

fn stop(ctx: &Context, team: &str) -> Result<()> {
    let members = members_of(ctx, team)?;
    let supervisor = Arc::new(Supervisor::new(
        codes_storage::Store::new(ctx.store.root()),
        ctx.clock.clone(),
        BackoffPolicy::default(),
    )?);
    for member in &members {
        supervisor.stop(team, member);
    }
    println!("stop requested for {} member(s) of {team}", members.len());
    Ok(())
}

fn status(ctx: &Context, team: &str, format: OutputFormat) -> Result<()> {
    let members = members_of(ctx, team)?;
    let supervisor = Supervisor::new(codes_storage::Store::new(ctx.store.root()), ctx.clock.clone(), BackoffPolicy::default())?;

    let rows: Vec<(String, Option<codes_daemon::AgentHealth>)> =
        members.iter().map(|m| (m.clone(), supervisor.health(team, m))).collect();

    match format {
        OutputFormat::Json => {
            let obj: Vec<_> = rows
                .iter()
                .map(|(name, h)| {
                    serde_json::json!({
                        "member": name,
                        "alive": h.as_ref().map(|h| h.alive),
                        "restart_count": h.as_ref().map(|h| h.restart_count),
                        "supervised": h.as_ref().map(|h| h.supervised),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::left("MEMBER"),
                Column::status("STATUS"),
                Column::right("RESTARTS"),
                Column::muted("LAST_CRASH"),
            ]);
            for (name, health) in &rows {
                match health {
                    Some(h) => {
                        let status = if h.alive { "running" } else { "stopped" };
                        let crash = h.last_crash.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string());
                        table.row(vec![name.clone(), status.to_string(), h.restart_count.to_string(), crash]);
                    }
                    None => table.row(vec![name.clone(), "unknown".to_string(), "-".to_string(), "-".to_string()]),
                }
            }
            table.render(&mut std::io::stdout());
        }
    }
    Ok(())
}

async fn logs(follow: bool) -> Result<()> {
    let base = codes_daemon::base_dir()?;
    let path = log_path(&base);
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    print!("{content}");
    if follow {
        tail_file(&path).await?;
    }
    Ok(())
}
