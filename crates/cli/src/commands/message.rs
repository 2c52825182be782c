// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Direct/broadcast messaging (§4.3).

use anyhow::Result;
use clap::{Args, Subcommand};
use codes_core::{Message, MessageType, RandomIdGen};
use codes_storage::MessageRepo;

use crate::context::Context;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct MessageArgs {
    #[command(subcommand)]
    pub command: MessageCommand,
}

#[derive(Subcommand)]
pub enum MessageCommand {
    /// Send a direct chat message to one member
    Send { team: String, from: String, to: String, content: String },
    /// Broadcast a chat message to every member
    Broadcast { team: String, from: String, content: String },
    /// List messages addressed to a member
    List {
        team: String,
        member: String,
        #[arg(long)]
        unread_only: bool,
    },
}

pub fn run(args: MessageArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    let repo = MessageRepo::new(&ctx.store);
    match args.command {
        MessageCommand::Send { team, from, to, content } => {
            let suffix = RandomIdGen::short_hex(8);
            let msg = repo.send(&team, MessageType::Chat, &from, &to, &content, None, &suffix, ctx.clock.as_ref())?;
            println!("sent {}", msg.id);
            Ok(())
        }
        MessageCommand::Broadcast { team, from, content } => {
            let suffix = RandomIdGen::short_hex(8);
            let msg = repo.broadcast(&team, MessageType::Chat, &from, &content, &suffix, ctx.clock.as_ref())?;
            println!("broadcast {}", msg.id);
            Ok(())
        }
        MessageCommand::List { team, member, unread_only } => {
            let messages = repo.get_for(&team, &member, unread_only)?;
            print_messages(&messages, format)
        }
    }
}

fn print_messages(messages: &[Message], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(messages)?),
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::muted("FROM"),
                Column::muted("TO"),
                Column::left("CONTENT"),
                Column::right("READ"),
            ]);
            for m in messages {
                let to = if m.is_broadcast() { "(broadcast)".to_string() } else { m.recipient.clone() };
                table.row(vec![m.sender.clone(), to, m.content.clone(), m.read.to_string()]);
            }
            table.render(&mut std::io::stdout());
        }
    }
    Ok(())
}
