//! Database operations for the ratings `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `accounts` - Every platform identity (admin, user, store owner)
//! - `stores` - Rateable stores, optionally owned by an account
//! - `ratings` - One score per (account, store) pair
//!
//! Average ratings are never stored; every read computes them with
//! `COALESCE(AVG(score), 0)` so they always reflect the current rows.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p store-ratings-cli -- migrate
//! ```

pub mod accounts;
pub mod ratings;
pub mod stores;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

pub use accounts::AccountRepository;
pub use ratings::RatingRepository;
pub use stores::StoreRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// SQLSTATE raised when `statement_timeout` cancels a query.
const QUERY_CANCELED: &str = "57014";

/// Errors that can occur during repository operations.
///
/// Not-found is never an error at this layer; lookups return `Option`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write. Holds the constraint name.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// A foreign key or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// The database could not be reached in time.
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Any other database error from sqlx.
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &error {
            let constraint = db_err.constraint().unwrap_or("unknown").to_owned();
            if db_err.is_unique_violation() {
                return Self::DuplicateKey(constraint);
            }
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
                return Self::ConstraintViolation(constraint);
            }
        }

        if is_unavailable(&error) {
            return Self::Unavailable(error);
        }

        Self::Database(error)
    }
}

fn is_unavailable(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(QUERY_CANCELED),
        _ => false,
    }
}

/// Pool settings shared by the server, the CLI, and the test harness.
///
/// `timeout` bounds how long a caller waits for a free connection.
#[must_use]
pub fn pool_options(timeout: Duration) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(timeout)
}

/// Parse connection options and attach a per-connection `statement_timeout`.
///
/// # Errors
///
/// Returns `sqlx::Error::Configuration` if the URL cannot be parsed.
pub fn connect_options(
    database_url: &SecretString,
    timeout: Duration,
) -> Result<PgConnectOptions, sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url.expose_secret())?;
    Ok(options.options([("statement_timeout", format!("{}ms", timeout.as_millis()))]))
}

/// Create a `PostgreSQL` connection pool.
///
/// Both connection acquisition and individual statements are bounded by
/// `timeout`.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(database_url, timeout)?;
    pool_options(timeout).connect_with(options).await
}

/// Escape `%`, `_`, and `\` so user input matches literally inside `ILIKE`,
/// then wrap it for a substring match.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Turn an optional filter value into an `ILIKE` pattern, ignoring blanks.
pub(crate) fn optional_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(like_pattern)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("coffee"), "%coffee%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_optional_pattern_skips_blank() {
        assert_eq!(optional_pattern(None), None);
        assert_eq!(optional_pattern(Some("   ")), None);
        assert_eq!(optional_pattern(Some(" main ")).as_deref(), Some("%main%"));
    }

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(matches!(
            RepositoryError::from(sqlx::Error::PoolTimedOut),
            RepositoryError::Unavailable(_)
        ));
        assert!(matches!(
            RepositoryError::from(sqlx::Error::PoolClosed),
            RepositoryError::Unavailable(_)
        ));
    }

    #[test]
    fn test_row_not_found_is_plain_database_error() {
        assert!(matches!(
            RepositoryError::from(sqlx::Error::RowNotFound),
            RepositoryError::Database(_)
        ));
    }

    #[test]
    fn test_connect_options_accepts_url() {
        let url = SecretString::from("postgres://ratings@localhost:5432/ratings");
        assert!(connect_options(&url, Duration::from_secs(5)).is_ok());
    }
}
