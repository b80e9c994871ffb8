//! Command-line surface: replay an exported chat log against a roster and print the
//! resulting parade report.

use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Timelike};
use clap::{Parser, Subcommand};
use log::{info, warn};

use crate::{
    db::Database,
    feed::RawMessage,
    interpretation::InterpretationEngine,
    models::Message,
    report::{self, ParadeReport, ReportSlot},
    roster::RosterTable,
    settings::SettingsStore,
};

#[derive(Parser, Debug)]
#[command(name = "detail-tracker")]
#[command(version, about = "Tracks vehicle details and parade state from movement chat traffic")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay chat messages against a roster, persist the result and print the report
    Replay {
        /// Roster grid as a JSON array of rows (arrays of cell strings)
        #[arg(long)]
        roster: PathBuf,

        /// Scraped chat bubbles, one JSON object per line
        #[arg(long)]
        messages: PathBuf,

        /// SQLite state file; overrides the settings file
        #[arg(long)]
        db: Option<PathBuf>,

        #[arg(long, default_value = "detail-tracker.json")]
        settings: PathBuf,

        /// Ignore messages sent before this instant
        #[arg(long)]
        since: Option<DateTime<FixedOffset>>,
    },

    /// Print the parade report for a roster without replaying anything
    Report {
        #[arg(long)]
        roster: PathBuf,

        #[arg(long, default_value = "detail-tracker.json")]
        settings: PathBuf,
    },
}

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay {
            roster,
            messages,
            db,
            settings,
            since,
        } => replay(&roster, &messages, db, settings, since).await,
        Commands::Report { roster, settings } => {
            let settings = SettingsStore::new(settings)?;
            let table = load_roster(&roster)?;
            print_report(&table, &settings, Local::now().naive_local());
            Ok(())
        }
    }
}

async fn replay(
    roster_path: &Path,
    messages_path: &Path,
    db_path: Option<PathBuf>,
    settings_path: PathBuf,
    since: Option<DateTime<FixedOffset>>,
) -> Result<()> {
    let settings = SettingsStore::new(settings_path)?;
    let roster = load_roster(roster_path)?;
    let now = Local::now().naive_local();

    let database = match db_path.or_else(|| settings.database_path()) {
        Some(path) => Some(Database::new(path)?),
        None => None,
    };

    let mut engine = match &database {
        Some(db) => {
            let (_, registry) = db.load_state().await?;
            info!("Restored {} ongoing details", registry.len());
            InterpretationEngine::with_registry(roster, registry, settings.engine_config())
        }
        None => InterpretationEngine::new(roster, settings.engine_config()),
    };

    let since = since.map(|at| at.naive_local());
    let mut processed = 0usize;
    let mut last_seen = None;
    for message in read_messages(messages_path, now)? {
        if since.is_some_and(|since| message.timestamp < since) {
            continue;
        }
        last_seen = Some(message.timestamp);
        match engine.process(&message) {
            Ok(_) => processed += 1,
            Err(err) => warn!("Skipping message from {}: {err}", message.sender),
        }
    }
    info!("Processed {processed} messages");

    if let Some(db) = &database {
        db.save_state(&engine.snapshot()).await?;
        info!("State saved to {}", db.path().display());
    }

    print_report(engine.roster(), &settings, last_seen.unwrap_or(now));
    Ok(())
}

fn load_roster(path: &Path) -> Result<RosterTable> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read roster from {}", path.display()))?;
    let grid: Vec<Vec<String>> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON grid of strings", path.display()))?;
    RosterTable::load(&grid).with_context(|| format!("Invalid roster in {}", path.display()))
}

/// Relevant messages from a JSON-lines export, in file order.
fn read_messages(path: &Path, now: NaiveDateTime) -> Result<Vec<Message>> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open messages at {}", path.display()))?;

    let mut messages = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawMessage = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed message", path.display(), index + 1))?;
        match raw.into_message(now) {
            Ok(Some(message)) => messages.push(message),
            Ok(None) => {}
            Err(err) => warn!("{}:{}: {err:#}", path.display(), index + 1),
        }
    }
    Ok(messages)
}

fn print_report(roster: &RosterTable, settings: &SettingsStore, at: NaiveDateTime) {
    let summary = ParadeReport::build(roster.rows());
    let slot = ReportSlot::from_hour(at.hour());
    println!(
        "{}",
        report::render(&summary, &settings.report().unit_name, at.date(), slot)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_arguments_parse() {
        let cli = Cli::try_parse_from([
            "detail-tracker",
            "replay",
            "--roster",
            "grid.json",
            "--messages",
            "chat.jsonl",
            "--since",
            "2021-02-03T08:00:00+08:00",
        ])
        .unwrap();

        match cli.command {
            Commands::Replay {
                roster,
                since,
                db,
                settings,
                ..
            } => {
                assert_eq!(roster, PathBuf::from("grid.json"));
                assert_eq!(db, None);
                assert_eq!(settings, PathBuf::from("detail-tracker.json"));
                assert_eq!(since.unwrap().naive_local().hour(), 8);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn messages_file_is_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");
        fs::write(
            &path,
            concat!(
                r#"{"prePlainText":"[08:00, 3/2/2021] Tan Wei Ming CPL: ","text":"3T MOV\nTO: CPL Tan\nMID: SBA1234A"}"#,
                "\n\n",
                r#"{"prePlainText":"[08:05, 3/2/2021] Someone: ","text":"good morning"}"#,
                "\n",
            ),
        )
        .unwrap();

        let now = chrono::NaiveDate::from_ymd_opt(2021, 2, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let messages = read_messages(&path, now).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].lines[0], "3T MOV");
        assert_eq!(messages[0].sender, "Tan Wei Ming CPL");
    }
}
