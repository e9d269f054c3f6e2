//! Atmos CLI - Database migrations and waitlist management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! atmos-cli migrate
//!
//! # Waitlist figures
//! atmos-cli waitlist count
//! atmos-cli waitlist stats
//!
//! # Export the waitlist as JSON lines
//! atmos-cli waitlist export --status active
//!
//! # Unsubscribe an address
//! atmos-cli waitlist unsubscribe --email someone@example.com
//! ```
//!
//! Logs go to stderr so exports can be piped.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atmos-cli")]
#[command(author, version, about = "Atmos storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Inspect and manage the waitlist
    Waitlist {
        #[command(subcommand)]
        action: WaitlistAction,
    },
}

#[derive(Subcommand)]
enum WaitlistAction {
    /// Print the number of active entries
    Count,
    /// Print aggregate statistics as JSON
    Stats,
    /// Export entries as JSON lines to stdout
    Export {
        /// Only export entries with this status (`active`, `notified`, `converted`, `unsubscribed`)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Unsubscribe an email address
    Unsubscribe {
        /// Email address to unsubscribe
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Waitlist { action } => match action {
            WaitlistAction::Count => commands::waitlist::count().await?,
            WaitlistAction::Stats => commands::waitlist::stats().await?,
            WaitlistAction::Export { status } => {
                commands::waitlist::export(status.as_deref()).await?;
            }
            WaitlistAction::Unsubscribe { email } => {
                commands::waitlist::unsubscribe(&email).await?;
            }
        },
    }
    Ok(())
}
