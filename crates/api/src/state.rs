//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::TokenKeys;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything inside is immutable after
/// startup; the database is the only shared mutable resource.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    tokens: TokenKeys,
}

impl AppState {
    /// Create a new application state, deriving token keys from `config`.
    #[must_use]
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        let tokens = TokenKeys::new(&config.jwt_secret, config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner { pool, tokens }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the token signing keys.
    #[must_use]
    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }
}
