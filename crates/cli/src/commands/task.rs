// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task lifecycle commands (§4.4).

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use codes_core::{Priority, Task, TaskStatus};
use codes_storage::TaskRepo;

use crate::context::Context;
use crate::output::OutputFormat;
use crate::table::{Column, Table};

#[derive(Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    pub command: TaskCommand,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PriorityArg {
    High,
    Normal,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::High => Priority::High,
            PriorityArg::Normal => Priority::Normal,
            PriorityArg::Low => Priority::Low,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Pending,
    Assigned,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl From<StatusArg> for TaskStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Pending => TaskStatus::Pending,
            StatusArg::Assigned => TaskStatus::Assigned,
            StatusArg::Running => TaskStatus::Running,
            StatusArg::Completed => TaskStatus::Completed,
            StatusArg::Failed => TaskStatus::Failed,
            StatusArg::Cancelled => TaskStatus::Cancelled,
        }
    }
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task
    Create {
        team: String,
        subject: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long, value_enum, default_value = "normal")]
        priority: PriorityArg,
        #[arg(long = "project")]
        project: Option<String>,
        #[arg(long = "work-dir")]
        work_dir: Option<String>,
        /// Task ids this task depends on; it is blocked until they complete
        #[arg(long = "depends-on", value_delimiter = ',')]
        depends_on: Vec<u64>,
    },
    /// List tasks, optionally filtered
    List {
        team: String,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(long)]
        owner: Option<String>,
    },
    /// Show one task
    Show { team: String, id: u64 },
    /// Assign an unowned task to a member
    Assign { team: String, id: u64, owner: String },
    /// Cancel a task
    Cancel { team: String, id: u64 },
    /// Cancel a task and create a replacement inheriting its owner/project
    Redirect {
        team: String,
        id: u64,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
}

pub fn run(args: TaskArgs, ctx: &Context, format: OutputFormat) -> Result<()> {
    let repo = TaskRepo::new(&ctx.store);
    match args.command {
        TaskCommand::Create { team, subject, description, owner, priority, project, work_dir, depends_on } => {
            let owner = owner.unwrap_or_default();
            let task = repo.create(&team, &subject, &owner, ctx.clock.as_ref())?;
            let task = repo.update(&team, task.id, move |t| {
                t.description = description;
                t.priority = priority.into();
                t.project = project;
                t.work_dir = work_dir;
                t.blocked_by = depends_on;
                Ok(())
            })?;
            println!("created task #{} in {team}", task.id);
            Ok(())
        }
        TaskCommand::List { team, status, owner } => {
            let tasks = repo.list(&team, status.map(Into::into), owner.as_deref())?;
            print_tasks(&tasks, format)
        }
        TaskCommand::Show { team, id } => {
            let task = repo.get(&team, id)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&task)?),
                OutputFormat::Text => print_task_detail(&task),
            }
            Ok(())
        }
        TaskCommand::Assign { team, id, owner } => {
            let task = repo.assign(&team, id, &owner, ctx.clock.as_ref())?;
            println!("task #{} assigned to {owner}", task.id);
            Ok(())
        }
        TaskCommand::Cancel { team, id } => {
            repo.cancel(&team, id, ctx.clock.as_ref())?;
            println!("task #{id} cancelled");
            Ok(())
        }
        TaskCommand::Redirect { team, id, subject, description } => {
            let replacement = repo.redirect(&team, id, subject.as_deref(), description.as_deref(), ctx.clock.as_ref())?;
            println!("task #{id} cancelled; replacement is #{}", replacement.id);
            Ok(())
        }
    }
}

fn print_tasks(tasks: &[Task], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(tasks)?),
        OutputFormat::Text => {
            let mut table = Table::new(vec![
                Column::right("ID"),
                Column::status("STATUS"),
                Column::muted("OWNER"),
                Column::left("SUBJECT"),
            ]);
            for t in tasks {
                let owner = if t.owner.is_empty() { "-".to_string() } else { t.owner.clone() };
                table.row(vec![t.id.to_string(), t.status.to_string(), owner, t.subject.clone()]);
            }
            table.render(&mut std::io::stdout());
        }
    }
    Ok(())
}

fn print_task_detail(task: &Task) {
    println!("#{} {}", task.id, crate::color::header(&task.subject));
    println!("  status:   {}", crate::color::status(&task.status.to_string()));
    println!("  owner:    {}", if task.owner.is_empty() { "-" } else { &task.owner });
    println!("  priority: {:?}", task.priority);
    if !task.blocked_by.is_empty() {
        println!("  blocked_by: {:?}", task.blocked_by);
    }
    if let Some(d) = &task.description {
        println!("  description: {d}");
    }
    if !task.result.is_empty() {
        println!("  result: {}", task.result);
    }
    if !task.error.is_empty() {
        println!("  error: {}", task.error);
    }
}
