// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent roster and health commands. "Agent" here names a team member's
//! slot in the roster; the running daemon process behind it is managed
//! by `codes daemon` (§4.7 Supervisor).

use anyhow::Result;
use clap::{Args, Subcommand};
use codes_core::Member;
use codes_storage::{Store, TeamRepo};

use crate::context::Context;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct AgentArgs {
    #[command(subcommand)]
    pub command: AgentCommand,
}

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Add a member to a team's roster
    Add {
        team: String,
        name: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Remove a member from a team's roster
    Remove { team: String, name: String },
    /// List a team's roster
    List { team: String },
}

pub fn run(args: AgentArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    let repo = TeamRepo::new(&ctx.store);
    match args.command {
        AgentCommand::Add { team, name, role, model } => {
            let mut t = repo.get(&team)?;
            let mut member = Member::new(&name);
            if let Some(r) = role {
                member = member.with_role(r);
            }
            if let Some(m) = model {
                member = member.with_model(m);
            }
            t.add_member(member)?;
            Store::write(&ctx.store.team_config_path(&team), &t)?;
            println!("added {name} to {team}");
            Ok(())
        }
        AgentCommand::Remove { team, name } => {
            let mut t = repo.get(&team)?;
            t.remove_member(&name)?;
            Store::write(&ctx.store.team_config_path(&team), &t)?;
            println!("removed {name} from {team}");
            Ok(())
        }
        AgentCommand::List { team } => {
            let t = repo.get(&team)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&t.members)?),
                OutputFormat::Text => {
                    let mut table = Table::new(vec![Column::left("NAME"), Column::muted("ROLE"), Column::muted("MODEL")]);
                    for m in &t.members {
                        table.row(vec![
                            m.name.clone(),
                            m.role.clone().unwrap_or_default(),
                            m.model.clone().unwrap_or_default(),
                        ]);
                    }
                    table.render(&mut std::io::stdout());
                }
            }
            Ok(())
        }
    }
}
