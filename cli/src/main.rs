//! # todoist-sync
//!
//! Reads a JSON task list and creates each task in Todoist, with an absolute
//! reminder when the task has a `due_time`.
//!
//! ## Example
//!
//! ```bash
//! export TODOIST_KEY=...
//! echo '[{"name":"Buy milk","due_time":"09:30"},{"name":"Read"}]' > task.json
//! todoist-sync                 # one request per task
//! todoist-sync --batch         # one request for the whole list
//! todoist-sync --dry-run       # print request bodies, send nothing
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use todoist_core::builder::DEFAULT_PRIORITY;
use todoist_core::config::{DEFAULT_ENDPOINT, DEFAULT_LANG, DEFAULT_TIMEZONE};
use todoist_core::tasks::DEFAULT_TASKS_FILE;
use todoist_core::{
    load_tasks, plan, ApiToken, CommandBuilder, Delivery, Dispatcher, RandomIds, RunReport, Settings, TaskOutcome,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod transport;

use transport::UreqTransport;

/// Push a JSON task list into Todoist.
///
/// The API token is read from TODOIST_KEY and is never accepted as a flag.
#[derive(Parser, Debug)]
#[command(name = "todoist-sync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Task list: a JSON array of {"name", "due_time"?} objects
    #[arg(long, env = "TASKS_FILE", default_value = DEFAULT_TASKS_FILE)]
    tasks: PathBuf,

    /// Sync endpoint URL
    #[arg(long, env = "TODOIST_SYNC_URL", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// IANA timezone used for due dates
    #[arg(long, env = "TODOIST_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// Language tag sent with due dates
    #[arg(long, env = "TODOIST_LANG", default_value = DEFAULT_LANG)]
    lang: String,

    /// Priority for created items, 1 (normal) to 4 (urgent)
    #[arg(long, env = "TODOIST_PRIORITY", default_value_t = DEFAULT_PRIORITY)]
    priority: u8,

    /// Send every task in a single request
    #[arg(long)]
    batch: bool,

    /// Print the request bodies instead of sending them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();
    let delivery = if cli.batch { Delivery::Batch } else { Delivery::PerTask };

    let settings = Settings::new(&cli.endpoint, &cli.timezone, &cli.lang, cli.priority)
        .context("invalid configuration")?;
    let token = if cli.dry_run {
        None
    } else {
        Some(ApiToken::new(std::env::var("TODOIST_KEY").ok()).context("invalid configuration")?)
    };

    let tasks = load_tasks(&cli.tasks)?;
    info!(count = tasks.len(), file = %cli.tasks.display(), "loaded tasks");

    let now = chrono::Utc::now().with_timezone(&settings.timezone);

    let Some(token) = token else {
        let mut builder = CommandBuilder::new(RandomIds, &settings.lang, settings.priority);
        let batches = plan(&mut builder, &tasks, &now, delivery);
        for batch in &batches {
            println!("{}", serde_json::to_string_pretty(&batch.envelope)?);
        }
        print_report(&RunReport::dry_run(&batches));
        return Ok(ExitCode::SUCCESS);
    };

    let report = Dispatcher::new(&settings, token, RandomIds, UreqTransport::new(), delivery).run(&tasks, &now);
    print_report(&report);

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &RunReport) {
    for task in &report.tasks {
        match &task.outcome {
            TaskOutcome::Submitted(_) => println!("submitted    {}", task.name),
            TaskOutcome::SubmittedUnreadable(e) => println!("submitted    {} (response unreadable: {e})", task.name),
            TaskOutcome::Failed(e) => println!("failed       {}: {e}", task.name),
            TaskOutcome::DryRun => println!("planned      {}", task.name),
        }
    }
    if report.planned_only() > 0 {
        println!("{} planned, none sent (dry run)", report.planned_only());
        return;
    }
    println!(
        "{} submitted, {} failed, {} commands rejected",
        report.submitted(),
        report.failed(),
        report.rejected_commands
    );
}
