//! CLI subcommands.

pub mod admin;
pub mod migrate;

use std::time::Duration;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// How long the CLI waits for a connection or a statement.
const DB_TIMEOUT: Duration = Duration::from_secs(30);

/// Error returned when no database URL is configured.
#[derive(Debug, Error)]
#[error("Missing environment variable: RATINGS_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;

/// Read `RATINGS_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("RATINGS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

/// Connect using the same pool settings as the API server.
async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    Ok(store_ratings_api::db::create_pool(&url, DB_TIMEOUT).await?)
}
