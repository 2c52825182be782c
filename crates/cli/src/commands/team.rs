// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team roster management.

use anyhow::Result;
use clap::{Args, Subcommand};
use codes_core::Member;
use codes_storage::TeamRepo;

use crate::context::Context;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand)]
pub enum TeamCommand {
    /// Create a new team
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "working-dir")]
        working_dir: Option<String>,
    },
    /// List all teams
    List,
    /// Show a team's roster
    Show { name: String },
    /// Delete a team and all of its tasks/messages/agent state
    Delete { name: String },
}

pub fn run(args: TeamArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    let repo = TeamRepo::new(&ctx.store);
    match args.command {
        TeamCommand::Create { name, description, working_dir } => {
            let mut team = repo.create(&name, ctx.clock.as_ref())?;
            if let Some(d) = description {
                team = team.with_description(d);
            }
            if let Some(w) = working_dir {
                team = team.with_working_dir(w);
            }
            codes_storage::Store::write(&ctx.store.team_config_path(&name), &team)?;
            println!("created team {name}");
            Ok(())
        }
        TeamCommand::List => {
            let teams = repo.list()?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&teams)?),
                OutputFormat::Text => {
                    let mut table = Table::new(vec![Column::left("NAME"), Column::right("MEMBERS"), Column::muted("DESCRIPTION")]);
                    for team in &teams {
                        table.row(vec![
                            team.name.clone(),
                            team.members.len().to_string(),
                            team.description.clone().unwrap_or_default(),
                        ]);
                    }
                    table.render(&mut std::io::stdout());
                }
            }
            Ok(())
        }
        TeamCommand::Show { name } => {
            let team = repo.get(&name)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&team)?),
                OutputFormat::Text => {
                    println!("{}", crate::color::header(&team.name));
                    if let Some(d) = &team.description {
                        println!("  {d}");
                    }
                    for Member { name, role, model, .. } in &team.members {
                        let role = role.clone().unwrap_or_else(|| "-".to_string());
                        let model = model.clone().unwrap_or_else(|| "-".to_string());
                        println!("  {name}  role={role}  model={model}");
                    }
                }
            }
            Ok(())
        }
        TeamCommand::Delete { name } => {
            repo.delete(&name)?;
            println!("deleted team {name}");
            Ok(())
        }
    }
}
