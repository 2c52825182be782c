// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! codes — the operator CLI for the multi-agent orchestration core.
//!
//! Unlike the daemon and supervisor, this binary never holds a poll loop
//! of its own: every command reads or mutates the on-disk store directly
//! through `codes_storage`'s repositories, the same store the daemon
//! processes it manages use (§6 "On-disk layout"). There is no
//! control-plane RPC surface to talk to.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod color;
mod commands;
mod context;
mod output;
mod table;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{agent, daemon, message, task, team};
use context::Context;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "codes", version, about = "Operator CLI for the multi-agent orchestration core")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Team roster management
    Team(team::TeamArgs),
    /// Agent (team-member) roster and health
    Agent(agent::AgentArgs),
    /// Task lifecycle
    Task(task::TaskArgs),
    /// Direct and broadcast messaging
    Message(message::MessageArgs),
    /// Daemon supervision
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::load()?;

    match cli.command {
        Commands::Team(args) => team::run(args, &ctx, cli.output),
        Commands::Agent(args) => agent::run(args, &ctx, cli.output),
        Commands::Task(args) => task::run(args, &ctx, cli.output),
        Commands::Message(args) => message::run(args, &ctx, cli.output),
        Commands::Daemon(args) => daemon::run(args, &ctx, cli.output).await,
    }
}
