//! Auth event log - sign-in, signup, session and location events in logs.duckdb
//!
//! Every event belongs to a [`LogFlow`]. Failures carry the same error code
//! the user-facing error reports (`invalid_credentials`,
//! `email_already_registered`, `geolocation_permission_denied`, ...), so the
//! log answers "which flow is failing, and why" without holding user data:
//! no e-mails, names, phone numbers, addresses, passwords, tokens or
//! coordinates are written.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::Utc;
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::migration;

/// Which part of the storefront an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFlow {
    Login,
    Signup,
    Session,
    Location,
    Command,
}

impl LogFlow {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFlow::Login => "login",
            LogFlow::Signup => "signup",
            LogFlow::Session => "session",
            LogFlow::Location => "location",
            LogFlow::Command => "command",
        }
    }

    /// Flows where a failure means a customer could not get signed in
    pub fn is_auth(&self) -> bool {
        matches!(self, LogFlow::Login | LogFlow::Signup)
    }
}

impl fmt::Display for LogFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFlow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "login" => Ok(LogFlow::Login),
            "signup" => Ok(LogFlow::Signup),
            "session" => Ok(LogFlow::Session),
            "location" => Ok(LogFlow::Location),
            "command" => Ok(LogFlow::Command),
            other => Err(format!(
                "unknown flow '{}' (expected login, signup, session, location or command)",
                other
            )),
        }
    }
}

/// Who wrote the event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Cli,
    App,
}

impl LogSource {
    fn as_str(&self) -> &'static str {
        match self {
            LogSource::Cli => "cli",
            LogSource::App => "app",
        }
    }
}

/// One event to append
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub flow: LogFlow,
    pub event: String,
    pub command: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl LogEvent {
    pub fn new(flow: LogFlow, event: impl Into<String>) -> Self {
        Self {
            flow,
            event: event.into(),
            command: None,
            error_code: None,
            error_message: None,
        }
    }

    /// CLI subcommand that was run
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Mark the event as a failure
    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self.error_message = Some(message.into());
        self
    }
}

/// A stored event
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: i64,
    pub logged_at: i64,
    pub source: String,
    pub app_version: String,
    pub flow: String,
    pub event: String,
    pub command: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Filter for [`LoggingService::entries`]
#[derive(Debug, Clone)]
pub struct LogQuery {
    pub limit: usize,
    pub flow: Option<LogFlow>,
    pub error_code: Option<String>,
    pub failures_only: bool,
}

impl LogQuery {
    /// Newest `limit` events of any kind
    pub fn recent(limit: usize) -> Self {
        Self {
            limit,
            flow: None,
            error_code: None,
            failures_only: false,
        }
    }

    pub fn in_flow(mut self, flow: Option<LogFlow>) -> Self {
        self.flow = flow;
        self
    }

    /// Only failures with this error code
    pub fn with_code(mut self, code: Option<String>) -> Self {
        self.error_code = code;
        self
    }

    pub fn failures(mut self, failures_only: bool) -> Self {
        self.failures_only = failures_only;
        self
    }
}

/// Failures of one kind within one flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureCount {
    pub flow: String,
    pub error_code: String,
    pub failures: u64,
    pub last_seen: i64,
}

fn row_to_entry(row: &duckdb::Row) -> duckdb::Result<LogEntry> {
    Ok(LogEntry {
        id: row.get(0)?,
        logged_at: row.get(1)?,
        source: row.get(2)?,
        app_version: row.get(3)?,
        flow: row.get(4)?,
        event: row.get(5)?,
        command: row.get(6)?,
        error_code: row.get(7)?,
        error_message: row.get(8)?,
    })
}

/// Unix time in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub struct LoggingService {
    conn: Mutex<Connection>,
    source: LogSource,
    app_version: String,
}

impl LoggingService {
    /// Open (or create) logs.duckdb in the navkar directory
    pub fn new(navkar_dir: &Path, source: LogSource, app_version: impl Into<String>) -> Result<Self> {
        let conn = Connection::open(navkar_dir.join("logs.duckdb"))?;
        migration::apply(&conn, LOG_MIGRATIONS)?;

        Ok(Self {
            conn: Mutex::new(conn),
            source,
            app_version: app_version.into(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sys_logs (logged_at, source, app_version, flow, event, command, error_code, error_message)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                now_ms(),
                self.source.as_str(),
                &self.app_version,
                event.flow.as_str(),
                &event.event,
                &event.command,
                &event.error_code,
                &event.error_message,
            ],
        )?;
        Ok(())
    }

    /// Events matching `query`, newest first
    pub fn entries(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let mut clauses = Vec::new();
        let mut args: Vec<String> = Vec::new();
        if let Some(flow) = query.flow {
            clauses.push("flow = ?");
            args.push(flow.as_str().to_string());
        }
        if let Some(code) = &query.error_code {
            clauses.push("error_code = ?");
            args.push(code.clone());
        }
        if query.failures_only {
            clauses.push("error_code IS NOT NULL");
        }

        let mut sql = String::from(
            "SELECT id, logged_at, source, app_version, flow, event, command, error_code, error_message
             FROM sys_logs",
        );
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(&format!(" ORDER BY logged_at DESC, id DESC LIMIT {}", query.limit));

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(duckdb::params_from_iter(args.iter()), row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Failures at or after `since_ms`, grouped by flow and error code,
    /// most frequent first
    pub fn failure_counts(&self, since_ms: i64) -> Result<Vec<FailureCount>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT flow, error_code, COUNT(*) AS failures, MAX(logged_at) AS last_seen
             FROM sys_logs
             WHERE error_code IS NOT NULL AND logged_at >= ?
             GROUP BY flow, error_code
             ORDER BY failures DESC, flow, error_code",
        )?;
        let counts = stmt
            .query_map([since_ms], |row| {
                Ok(FailureCount {
                    flow: row.get(0)?,
                    error_code: row.get(1)?,
                    failures: row.get(2)?,
                    last_seen: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(counts)
    }

    /// Delete events logged before `cutoff_ms`; returns how many went
    pub fn purge_before(&self, cutoff_ms: i64) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE logged_at < ?", [cutoff_ms])?;
        Ok(deleted as u64)
    }
}

/// Append to an optional logger; a logging failure never fails the caller
pub fn record(logger: Option<&LoggingService>, event: LogEvent) {
    if let Some(logger) = logger {
        let _ = logger.log(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open(dir: &Path) -> LoggingService {
        LoggingService::new(dir, LogSource::App, "0.1.0").unwrap()
    }

    fn login_failed(code: &str) -> LogEvent {
        LogEvent::new(LogFlow::Login, "login_failed").with_error(code, "rejected")
    }

    #[test]
    fn test_entries_filter_by_flow_and_code() {
        let dir = tempdir().unwrap();
        let service = open(dir.path());

        service.log(LogEvent::new(LogFlow::Login, "login_succeeded")).unwrap();
        service.log(login_failed("invalid_credentials")).unwrap();
        service
            .log(LogEvent::new(LogFlow::Signup, "signup_failed").with_error("password_mismatch", "x"))
            .unwrap();
        service
            .log(LogEvent::new(LogFlow::Command, "command_executed").with_command("whoami"))
            .unwrap();

        let all = service.entries(&LogQuery::recent(10)).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].event, "command_executed");
        assert_eq!(all[0].command.as_deref(), Some("whoami"));
        assert_eq!(all[0].source, "app");

        let login = service
            .entries(&LogQuery::recent(10).in_flow(Some(LogFlow::Login)))
            .unwrap();
        assert_eq!(login.len(), 2);

        let failures = service.entries(&LogQuery::recent(10).failures(true)).unwrap();
        let flows: Vec<&str> = failures.iter().map(|e| e.flow.as_str()).collect();
        assert_eq!(flows, vec!["signup", "login"]);

        let mismatches = service
            .entries(&LogQuery::recent(10).with_code(Some("password_mismatch".into())))
            .unwrap();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].event, "signup_failed");

        assert_eq!(service.entries(&LogQuery::recent(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_failure_counts_group_by_flow_and_code() {
        let dir = tempdir().unwrap();
        let service = open(dir.path());

        for _ in 0..3 {
            service.log(login_failed("invalid_credentials")).unwrap();
        }
        service.log(login_failed("request_in_flight")).unwrap();
        service
            .log(
                LogEvent::new(LogFlow::Location, "location_failed")
                    .with_error("geolocation_timeout", "Timeout expired"),
            )
            .unwrap();
        service.log(LogEvent::new(LogFlow::Login, "login_succeeded")).unwrap();

        let counts = service.failure_counts(0).unwrap();
        let summary: Vec<(&str, &str, u64)> = counts
            .iter()
            .map(|c| (c.flow.as_str(), c.error_code.as_str(), c.failures))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("login", "invalid_credentials", 3),
                ("location", "geolocation_timeout", 1),
                ("login", "request_in_flight", 1),
            ]
        );

        assert!(service.failure_counts(now_ms() + 60_000).unwrap().is_empty());
    }

    #[test]
    fn test_purge_before_keeps_newer_events() {
        let dir = tempdir().unwrap();
        let service = open(dir.path());
        service.log(login_failed("invalid_credentials")).unwrap();

        assert_eq!(service.purge_before(now_ms() - 60_000).unwrap(), 0);
        assert_eq!(service.purge_before(now_ms() + 1000).unwrap(), 1);
        assert!(service.entries(&LogQuery::recent(10)).unwrap().is_empty());
    }

    #[test]
    fn test_log_reopens_existing_database() {
        let dir = tempdir().unwrap();
        open(dir.path()).log(LogEvent::new(LogFlow::Session, "logout")).unwrap();

        let service = LoggingService::new(dir.path(), LogSource::Cli, "0.2.0").unwrap();
        service.log(LogEvent::new(LogFlow::Session, "session_restored")).unwrap();

        let entries = service.entries(&LogQuery::recent(10)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, "cli");
        assert_eq!(entries[1].app_version, "0.1.0");
    }

    #[test]
    fn test_flow_names_parse() {
        assert_eq!("signup".parse::<LogFlow>(), Ok(LogFlow::Signup));
        assert!("checkout".parse::<LogFlow>().is_err());
        assert!(LogFlow::Login.is_auth());
        assert!(!LogFlow::Location.is_auth());
    }

    #[test]
    fn test_record_without_logger_is_noop() {
        record(None, LogEvent::new(LogFlow::Session, "logout"));
    }
}
