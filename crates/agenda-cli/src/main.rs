//! `agenda` CLI — check, share and view event programs stored as JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Readiness report (stdin → stdout)
//! cat program.json | agenda check
//!
//! # Would a new item at 09:30-10:30 conflict with anything?
//! agenda conflicts -i program.json --start 2026-03-01T09:30:00Z --end 2026-03-01T10:30:00Z
//!
//! # Moving item 4: ignore its own current slot
//! agenda conflicts -i program.json --start ... --end ... --exclude 4
//!
//! # Share a ready program, writing the updated document
//! agenda share -i program.json -o program.json
//!
//! # Public view of a shared program
//! agenda view -i program.json
//! ```
//!
//! A program document is `{"schedule": {...}, "items": [...]}`.

use agenda_engine::overview::public_view;
use agenda_engine::{
    check_item, evaluate, AgendaError, Interval, Item, ItemId, MemoryShareStore, Schedule,
    ShareLifecycle,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agenda", version, about = "Event program validation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter directive written to stderr (e.g. "debug", "agenda_engine=info")
    #[arg(long, env = "AGENDA_LOG", default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the readiness report of a program
    Check {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List existing items that a candidate time range would conflict with
    Conflicts {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Candidate start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// Candidate end (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        /// Id of the item being updated; its current slot is ignored
        #[arg(long)]
        exclude: Option<u64>,
    },
    /// Share a ready program and write the updated document
    ///
    /// Each run uses a fresh in-memory share store, so token uniqueness across
    /// programs is not checked here; that is the job of a persistent store.
    Share {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the public view of a shared program
    View {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

#[derive(Serialize, Deserialize)]
struct Document {
    schedule: Schedule,
    #[serde(default)]
    items: Vec<Item>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Check { input } => {
            let doc = read_document(input.as_deref())?;
            let readiness = evaluate(&doc.schedule, &doc.items);
            println!("{}", serde_json::to_string_pretty(&readiness)?);
        }
        Commands::Conflicts {
            input,
            start,
            end,
            exclude,
        } => {
            let doc = read_document(input.as_deref())?;
            let exclude = exclude.map(ItemId);
            // The candidate's own id only matters through `exclude`.
            let candidate = Interval::new(exclude.unwrap_or(ItemId(0)), start, end);
            let existing: Vec<Interval> = doc.items.iter().map(Item::interval).collect();

            let conflicts = match check_item(&existing, &candidate, exclude) {
                Ok(()) => Vec::new(),
                Err(AgendaError::ConflictDetected { conflicts }) => conflicts,
                Err(e) => return Err(e).context("Candidate rejected"),
            };
            println!("{}", serde_json::to_string(&conflicts)?);
        }
        Commands::Share { input, output } => {
            let mut doc = read_document(input.as_deref())?;
            let lifecycle = ShareLifecycle::new(MemoryShareStore::new());
            let share = lifecycle
                .share(&mut doc.schedule, &doc.items)
                .context("Failed to share program")?;
            debug!(token = %share.token, path = %share.token.share_path(), "share ready");

            let json = serde_json::to_string_pretty(&doc)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::View { input } => {
            let doc = read_document(input.as_deref())?;
            let view = public_view(&doc.schedule, &doc.items)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

/// Install a stderr subscriber so stdout stays machine readable.
fn init_logging(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter: {}", directive))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn read_document(path: Option<&str>) -> Result<Document> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).context("Failed to parse program document")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
