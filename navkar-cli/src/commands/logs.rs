//! `nk logs` - inspect sign-in, signup and location failures

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_navkar_dir;
use crate::output;
use navkar_core::services::{now_ms, LogFlow, LogQuery, LogSource, LoggingService};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// login, signup, session, location or command
        #[arg(long)]
        flow: Option<LogFlow>,
        /// Only failures with this error code, e.g. invalid_credentials
        #[arg(long)]
        code: Option<String>,
        /// Only failures
        #[arg(long)]
        failures: bool,
        #[arg(long)]
        json: bool,
    },
    /// Count failures per flow and error code
    Failures {
        /// Look back this many days
        #[arg(long, default_value = "7")]
        days: u64,
        /// Only login and signup failures
        #[arg(long)]
        auth: bool,
        #[arg(long)]
        json: bool,
    },
    /// Delete events older than N days
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let navkar_dir = get_navkar_dir();
    std::fs::create_dir_all(&navkar_dir)?;
    LoggingService::new(&navkar_dir, LogSource::Cli, env!("CARGO_PKG_VERSION"))
}

fn days_ago_ms(days: u64) -> i64 {
    now_ms() - Duration::days(days as i64).num_milliseconds()
}

fn format_time(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List {
            limit,
            flow,
            code,
            failures,
            json,
        } => {
            let query = LogQuery::recent(limit)
                .in_flow(flow)
                .with_code(code)
                .failures(failures);
            let entries = open_log()?.entries(&query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("No matching events.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Flow", "Event", "Error"]);
            for entry in entries {
                let event = match entry.command {
                    Some(command) => format!("{} ({})", entry.event, command),
                    None => entry.event,
                };
                let error = match (entry.error_code, entry.error_message) {
                    (Some(code), Some(message)) => format!("{}: {}", code.red(), message),
                    (Some(code), None) => code.red().to_string(),
                    _ => String::new(),
                };
                table.add_row(vec![format_time(entry.logged_at), entry.flow, event, error]);
            }
            println!("{}", table);
        }
        LogsCommands::Failures { days, auth, json } => {
            let counts: Vec<_> = open_log()?
                .failure_counts(days_ago_ms(days))?
                .into_iter()
                .filter(|c| !auth || c.flow.parse::<LogFlow>().map_or(false, |f| f.is_auth()))
                .collect();
            let auth_total: u64 = counts
                .iter()
                .filter(|c| c.flow.parse::<LogFlow>().map_or(false, |f| f.is_auth()))
                .map(|c| c.failures)
                .sum();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "days": days,
                        "authFailures": auth_total,
                        "failures": counts,
                    }))?
                );
                return Ok(());
            }
            if counts.is_empty() {
                output::success(&format!("No failures in the last {} days.", days));
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Flow", "Error", "Count", "Last seen"]);
            for c in &counts {
                table.add_row(vec![
                    c.flow.clone(),
                    c.error_code.clone(),
                    c.failures.to_string(),
                    format_time(c.last_seen),
                ]);
            }
            println!("{}", table);
            println!(
                "{} failed sign-in attempts in the last {} days",
                auth_total.to_string().bold(),
                days
            );
        }
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => {
            if !force && !json {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete events older than {} days?", older_than_days))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = open_log()?.purge_before(days_ago_ms(older_than_days))?;
            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else {
                output::info(&format!("Deleted {} events", deleted));
            }
        }
    }

    Ok(())
}
