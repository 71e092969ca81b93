//! Top-level CLI definition and dispatch.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use crate::core::config::Config;
use crate::core::errors::{HsbError, Result};
use crate::daemon::{PollLoop, signals};
use crate::logger;
use crate::source::{PracticumSource, StatusSource};
use crate::tracker::{ChangeDetector, DetectorOptions, PollCursor, ReviewStatus, StatusEntry};

/// Homework status bot: relays review status changes to Telegram.
#[derive(Parser)]
#[command(name = "hsb", version, about)]
pub struct Cli {
    /// TOML configuration file (defaults to $HSB_CONFIG when set).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run the poll loop in the foreground until SIGINT/SIGTERM.
    Run {
        /// Run a single cycle without sleeping, then exit.
        #[arg(long)]
        once: bool,
    },
    /// Fetch current statuses once and print them; nothing is sent.
    Check {
        /// Lower bound for the request, epoch seconds.
        #[arg(long, default_value_t = 0)]
        since: i64,
        /// Print entries as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration with tokens masked.
    Config,
    /// Generate a shell completion script.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Dispatch CLI commands.
///
/// # Errors
/// Configuration errors are returned before anything runs; `check` also
/// returns poll and shape errors.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Run { once } => run_daemon(cli, *once),
        Command::Check { since, json } => run_check(cli, *since, *json),
        Command::Config => {
            logger::init_tracing("warn");
            let config = Config::load(cli.config.as_deref())?;
            print!("{}", config.to_masked_toml()?);
            Ok(())
        }
        Command::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "hsb", &mut io::stdout());
            Ok(())
        }
    }
}

fn run_daemon(cli: &Cli, once: bool) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    logger::init_tracing(&config.logging.filter);
    let credentials = config.validate()?;
    let mut poll = PollLoop::from_config(&config, &credentials)?;

    if once {
        let report = poll.run_cycle();
        tracing::info!(
            events = report.events.len(),
            delivered = report.delivery.delivered.len(),
            failed = report.delivery.failed.len(),
            pending = report.pending_after,
            cursor = report.cursor,
            "single cycle finished"
        );
        return match report.failure {
            Some(failure) => Err(HsbError::Runtime {
                details: failure.notice,
            }),
            None => Ok(()),
        };
    }

    let shutdown = signals::install()?;
    poll.run(&shutdown);
    Ok(())
}

fn run_check(cli: &Cli, since: i64, json: bool) -> Result<()> {
    logger::init_tracing("warn");
    let config = Config::load(cli.config.as_deref())?;
    let credentials = config.validate()?;
    let source =
        PracticumSource::new(&config.source.endpoint, &credentials.source_token, &config.http)?;

    let raw = source.fetch(since)?;
    let detector = ChangeDetector::new(DetectorOptions::from(&config.poll), PollCursor::new(since));
    let entries = detector.parse_batch(&raw)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("no homeworks updated since {since}");
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &StatusEntry) -> String {
    let status = match entry.status {
        ReviewStatus::Approved => entry.status.as_str().green(),
        ReviewStatus::Reviewing => entry.status.as_str().yellow(),
        ReviewStatus::Rejected => entry.status.as_str().red(),
    };
    let updated = chrono::DateTime::from_timestamp(entry.updated_at, 0)
        .map_or_else(|| entry.updated_at.to_string(), |stamp| stamp.to_rfc3339());
    let mut line = format!("{status:<10} {updated}  {}", entry.id.bold());
    if let Some(comment) = &entry.reviewer_comment {
        line.push_str(&format!("\n           {}", comment.dimmed()));
    }
    line
}
