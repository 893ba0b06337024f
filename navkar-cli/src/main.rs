//! Navkar CLI - storefront account and delivery location in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{location, login, logout, logs, signup, whoami};

/// Navkar - sign in to the storefront and set your delivery location
#[derive(Parser)]
#[command(name = "nk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to your account
    Login {
        /// Account e-mail (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
        /// Account password (prompted if omitted)
        #[arg(long, env = "NAVKAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Use the demo account (ignores --email and --password)
        #[arg(long)]
        demo: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create an account and sign in
    Signup {
        /// Full name
        #[arg(long)]
        name: Option<String>,
        /// E-mail address
        #[arg(long)]
        email: Option<String>,
        /// Phone number
        #[arg(long)]
        phone: Option<String>,
        /// Delivery address
        #[arg(long)]
        address: Option<String>,
        /// Password (prompted twice if omitted)
        #[arg(long, env = "NAVKAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out and forget the saved session
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show who is signed in
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up your current location for delivery
    Location {
        /// Use the location as the delivery location
        #[arg(long)]
        confirm: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { email, password, demo, json } => login::run(email, password, demo, json),
        Commands::Signup { name, email, phone, address, password, json } => {
            signup::run(signup::SignupArgs { name, email, phone, address, password, json })
        }
        Commands::Logout { json } => logout::run(json),
        Commands::Whoami { json } => whoami::run(json),
        Commands::Location { confirm, json } => location::run(confirm, json),
        Commands::Logs { command } => logs::run(command),
    }
}
