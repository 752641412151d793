//! Command-line front end for the kanban board.
//!
//! # Responsibility
//! - Map subcommands onto board commands and queries.
//! - Host the long-running reminder process (`watch`).
//!
//! # Invariants
//! - Every failure is reported on stderr with a non-zero exit code; nothing
//!   panics on bad input.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use kanban_core::model::timestamp::{format_timestamp, parse_user_timestamp};
use kanban_core::{
    init_logging, AppConfig, AppContext, Column, NotificationSink, SinkError, Task, TaskDraft,
    TaskId,
};
use log::warn;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "kanban",
    version,
    about = "Three-column task board with due-date reminders"
)]
struct Cli {
    /// Database file; overrides KANBAN_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a task in the To Do column.
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Due date, local time: "YYYY-MM-DD HH:MM[:SS]".
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDateTime>,
    },
    /// Replace a task's title, description and due date; resets reminders.
    Edit {
        id: TaskId,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_due)]
        due: Option<NaiveDateTime>,
    },
    /// Move a task to todo, doing or done.
    Move { id: TaskId, column: Column },
    /// Delete a task permanently.
    Delete { id: TaskId },
    /// Show one task.
    Show { id: TaskId },
    /// Show the board.
    List,
    /// Run one reminder poll and exit.
    Tick,
    /// Run the reminder scheduler until stdin closes or `quit` is entered.
    Watch {
        /// Poll interval; overrides KANBAN_POLL_INTERVAL_SECS.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

/// Prints reminders on stdout, then hands them to the configured sink.
struct TerminalSink {
    next: Box<dyn NotificationSink>,
}

impl NotificationSink for TerminalSink {
    fn notify(&self, heading: &str, body: &str) -> Result<(), SinkError> {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "[reminder] {heading} - {body}") {
            warn!("event=notify module=cli status=degraded channel=terminal error={err}");
        }
        self.next.notify(heading, body)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = AppConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = cli.db {
        config = config.with_db_path(db);
    }
    if let Command::Watch {
        interval_secs: Some(secs),
    } = &cli.command
    {
        config = config
            .with_poll_interval(Duration::from_secs(*secs))
            .map_err(|err| err.to_string())?;
    }

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let ctx = AppContext::open(config).map_err(|err| err.to_string())?;
    let board = ctx.board();

    match cli.command {
        Command::Add {
            title,
            description,
            due,
        } => {
            let task = board
                .create_task(&draft(title, description, due))
                .map_err(|err| err.to_string())?;
            println!("created task {}", task.id);
        }
        Command::Edit {
            id,
            title,
            description,
            due,
        } => {
            let task = board
                .edit_task(id, &draft(title, description, due))
                .map_err(|err| err.to_string())?;
            println!("updated task {} (reminders reset)", task.id);
        }
        Command::Move { id, column } => {
            board.move_task(id, column).map_err(|err| err.to_string())?;
            println!("moved task {id} to {}", column.label());
        }
        Command::Delete { id } => {
            board.delete_task(id).map_err(|err| err.to_string())?;
            println!("deleted task {id}");
        }
        Command::Show { id } => {
            let task = board.get_task(id).map_err(|err| err.to_string())?;
            print_task_detail(&task);
        }
        Command::List => {
            let view = board.board().map_err(|err| err.to_string())?;
            for column in Column::ALL {
                let tasks = view.column(column);
                println!("== {} ({})", column.label(), tasks.len());
                for task in tasks {
                    print_task_line(task);
                }
            }
        }
        Command::Tick => {
            let scheduler = ctx.scheduler(terminal_sink(&ctx));
            let report = scheduler.poll_once().map_err(|err| err.to_string())?;
            println!("fired {} reminder(s)", report.fired.len());
        }
        Command::Watch { .. } => watch(&ctx)?,
    }

    Ok(())
}

fn watch(ctx: &AppContext) -> Result<(), String> {
    let handle = ctx
        .start_scheduler(terminal_sink(ctx))
        .map_err(|err| format!("failed to start reminder worker: {err}"))?;
    println!(
        "watching {} every {}s; type `quit` or close stdin to stop",
        ctx.store().db_path().display(),
        ctx.config().poll_interval.as_secs()
    );

    for line in std::io::stdin().lock().lines() {
        match line {
            Ok(line) if line.trim().eq_ignore_ascii_case("quit") => break,
            Ok(_) => {}
            Err(err) => {
                warn!("event=watch_input module=cli status=error error={err}");
                break;
            }
        }
    }

    handle.stop();
    println!("reminder worker stopped");
    Ok(())
}

fn terminal_sink(ctx: &AppContext) -> TerminalSink {
    TerminalSink {
        next: ctx.default_sink(),
    }
}

fn draft(title: String, description: Option<String>, due: Option<NaiveDateTime>) -> TaskDraft {
    TaskDraft {
        title,
        description,
        due_at: due,
    }
}

fn parse_due(raw: &str) -> Result<NaiveDateTime, String> {
    parse_user_timestamp(raw)
        .ok_or_else(|| format!("invalid due date `{raw}`; expected YYYY-MM-DD HH:MM[:SS]"))
}

fn print_task_line(task: &Task) {
    let due = task
        .due_at
        .map(|due| format!(" (due {})", format_timestamp(due)))
        .unwrap_or_default();
    println!("  #{} {}{}", task.id, task.title, due);
}

fn print_task_detail(task: &Task) {
    println!("#{} {}", task.id, task.title);
    println!("column:  {}", task.column.label());
    println!("created: {}", format_timestamp(task.created_at));
    match task.due_at {
        Some(due) => println!("due:     {}", format_timestamp(due)),
        None => println!("due:     -"),
    }
    if let Some(description) = &task.description {
        println!("\n{description}");
    }
}
