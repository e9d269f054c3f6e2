//! CLI subcommands.

pub mod migrate;
pub mod waitlist;

use secrecy::SecretString;
use sqlx::PgPool;

/// Environment variable holding the storefront database URL.
pub const DATABASE_URL_VAR: &str = "STOREFRONT_DATABASE_URL";

/// Connect to the storefront database named by `STOREFRONT_DATABASE_URL`.
///
/// Loads `.env` first when present.
///
/// # Errors
///
/// Returns an error when the variable is missing or the connection fails.
pub async fn connect() -> Result<PgPool, ConnectError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var(DATABASE_URL_VAR)
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingEnvVar(DATABASE_URL_VAR))?;

    tracing::info!("Connecting to storefront database...");
    Ok(atmos_storefront::db::create_pool(&database_url).await?)
}

/// Errors raised while connecting to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}
