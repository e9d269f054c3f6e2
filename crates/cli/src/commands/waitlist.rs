//! Waitlist management commands.
//!
//! # Usage
//!
//! ```bash
//! # Active entry count
//! atmos-cli waitlist count
//!
//! # Aggregate statistics as JSON
//! atmos-cli waitlist stats
//!
//! # Export entries as JSON lines (optionally filtered by status)
//! atmos-cli waitlist export --status active > waitlist.jsonl
//!
//! # Unsubscribe an address
//! atmos-cli waitlist unsubscribe --email someone@example.com
//! ```

use std::io::{self, BufWriter, Write};

use thiserror::Error;

use atmos_core::{Email, WaitlistStatus};
use atmos_storefront::db::{RepositoryError, WaitlistRepository};

use super::{ConnectError, connect};

/// Errors that can occur during waitlist operations.
#[derive(Debug, Error)]
pub enum WaitlistCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("{0}")]
    InvalidStatus(String),

    #[error("No waitlist entry for {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

/// Print the number of active entries.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn count() -> Result<(), WaitlistCommandError> {
    let pool = connect().await?;
    let count = WaitlistRepository::new(&pool).count_active().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{count}");
    }
    Ok(())
}

/// Print aggregate statistics as pretty JSON.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn stats() -> Result<(), WaitlistCommandError> {
    let pool = connect().await?;
    let stats = WaitlistRepository::new(&pool).stats().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

/// Write entries to stdout, one JSON object per line, oldest first.
///
/// # Errors
///
/// Returns an error if the status is unknown, the query fails, or stdout
/// cannot be written.
pub async fn export(status: Option<&str>) -> Result<(), WaitlistCommandError> {
    let status = status
        .map(str::parse::<WaitlistStatus>)
        .transpose()
        .map_err(WaitlistCommandError::InvalidStatus)?;

    let pool = connect().await?;
    let entries = WaitlistRepository::new(&pool).list(status).await?;

    let mut out = BufWriter::new(io::stdout().lock());
    for entry in &entries {
        serde_json::to_writer(&mut out, entry)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    tracing::info!(exported = entries.len(), "Waitlist export complete");
    Ok(())
}

/// Mark an address as unsubscribed.
///
/// # Errors
///
/// Returns an error if the email is invalid or has no entry.
pub async fn unsubscribe(email: &str) -> Result<(), WaitlistCommandError> {
    let email =
        Email::normalize(email).map_err(|e| WaitlistCommandError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;
    if !WaitlistRepository::new(&pool).unsubscribe(&email).await? {
        return Err(WaitlistCommandError::NotFound(email.to_string()));
    }

    tracing::info!("Unsubscribed {email}");
    Ok(())
}
