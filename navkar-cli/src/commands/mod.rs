//! CLI command implementations

pub mod location;
pub mod login;
pub mod logout;
pub mod logs;
pub mod signup;
pub mod whoami;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use navkar_core::services::{AuthEvent, LogEvent, LogFlow, LogSource, LoggingService, SubmitOutcome};
use navkar_core::{NavkarContext, OperationResult};
use tokio::sync::mpsc::UnboundedReceiver;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let navkar_dir = get_navkar_dir();
    // Ensure directory exists
    std::fs::create_dir_all(&navkar_dir).ok()?;
    LoggingService::new(&navkar_dir, LogSource::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the Navkar directory from environment or default
pub fn get_navkar_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NAVKAR_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".navkar")
    }
}

/// Open the Navkar context for a command, with CLI event logging
pub fn get_context(command: &str) -> Result<NavkarContext> {
    let navkar_dir = get_navkar_dir();
    let logger = get_logger();
    log_event(&logger, LogEvent::new(LogFlow::Command, "command_executed").with_command(command));

    NavkarContext::new(&navkar_dir, logger).context("Failed to initialize navkar context")
}

/// Run an async operation on a fresh runtime
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Spinner shown while the account backend "thinks"
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Use the flag value, else prompt (refusing when stdin is not a terminal)
pub fn value_or_prompt(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(v) = value {
        return Ok(v);
    }
    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("Missing --{}; cannot prompt without a terminal", flag_name(prompt));
    }
    let v: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(v)
}

/// Use the flag value, else prompt without echo
pub fn password_or_prompt(value: Option<String>, confirm: bool) -> Result<(String, String)> {
    if let Some(p) = value {
        return Ok((p.clone(), p));
    }
    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("Missing --password; cannot prompt without a terminal");
    }
    let password = Password::new().with_prompt("Password").interact()?;
    if !confirm {
        return Ok((password.clone(), password));
    }
    // Mismatch is reported by the signup form itself
    let confirmation = Password::new().with_prompt("Confirm password").interact()?;
    Ok((password, confirmation))
}

fn flag_name(prompt: &str) -> String {
    prompt.to_lowercase().replace(' ', "-")
}

/// How the auth dialog ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEnd {
    Authenticated,
    Dismissed,
}

/// Follow the dialog's events until it signs the user in or closes
///
/// `Closed` follows `Authenticated` in the same completion step, so it is
/// already queued by the time `Authenticated` arrives.
pub async fn await_dialog(events: &mut UnboundedReceiver<AuthEvent>) -> DialogEnd {
    while let Some(event) = events.recv().await {
        match event {
            AuthEvent::Authenticated => {
                while events.try_recv().is_ok() {}
                return DialogEnd::Authenticated;
            }
            AuthEvent::Closed => return DialogEnd::Dismissed,
            AuthEvent::SwitchedToSignup | AuthEvent::SwitchedToLogin => {}
        }
    }
    DialogEnd::Dismissed
}

/// Print the result of a login/signup submission
///
/// The welcome line waits for the dialog's `Authenticated` event.
pub fn report_outcome(outcome: SubmitOutcome, end: Option<DialogEnd>, json: bool) -> Result<()> {
    match outcome {
        SubmitOutcome::Accepted(success) => {
            if json {
                let result = OperationResult::ok(&success.identity);
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", success.message.green());
                if end == Some(DialogEnd::Authenticated) {
                    println!("Welcome, {}!", success.identity.first_name().bold());
                }
            }
            Ok(())
        }
        SubmitOutcome::Rejected(e) => {
            if json {
                let result: OperationResult<()> = OperationResult::fail(e.to_string());
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Err(e.into())
        }
        SubmitOutcome::Invalid(errors) => {
            if json {
                let result: OperationResult<()> = OperationResult::fail(errors.to_string());
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            anyhow::bail!("{}", errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use navkar_core::adapters::memory::MemoryStorage;
    use navkar_core::adapters::mock_verifier::{MockCredentialVerifier, MockLatency};
    use navkar_core::services::{AuthFlowController, AuthView, SessionStore};
    use navkar_core::LoginRequest;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test(start_paused = true)]
    async fn test_login_dialog_ends_authenticated_and_closed() {
        let store = SessionStore::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(MockCredentialVerifier::new(MockLatency::default())),
            None,
        );
        let (flow, mut events) =
            AuthFlowController::new(Arc::new(store), Duration::from_millis(1500));
        flow.open(AuthView::Login);
        flow.switch_to_signup();
        flow.switch_to_login();

        let outcome = flow.submit_login(LoginRequest::demo()).await;
        assert!(matches!(outcome, SubmitOutcome::Accepted(_)));

        assert_eq!(await_dialog(&mut events).await, DialogEnd::Authenticated);
        assert_eq!(flow.view(), AuthView::Closed);
        assert!(flow.store().is_authenticated());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dialog_closed_before_sign_in_is_dismissed() {
        let (tx, mut rx) = unbounded_channel();
        tx.send(AuthEvent::SwitchedToSignup).unwrap();
        tx.send(AuthEvent::Closed).unwrap();
        tx.send(AuthEvent::Authenticated).unwrap();

        assert_eq!(await_dialog(&mut rx).await, DialogEnd::Dismissed);
        assert_eq!(rx.try_recv(), Ok(AuthEvent::Authenticated));
    }

    #[tokio::test]
    async fn test_dropped_dialog_is_dismissed() {
        let (tx, mut rx) = unbounded_channel::<AuthEvent>();
        drop(tx);
        assert_eq!(await_dialog(&mut rx).await, DialogEnd::Dismissed);
    }
}
