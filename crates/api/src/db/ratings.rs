//! Rating repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{AccountId, Email, RatingId, Score, StoreId};

use super::RepositoryError;
use crate::models::{PlatformStats, Rating, StoreRating};

/// Name of the foreign key from `ratings.store_id` to `stores.id`.
pub const STORE_FOREIGN_KEY: &str = "ratings_store_fk";

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: RatingId,
    account_id: AccountId,
    store_id: StoreId,
    score: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = RepositoryError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        let score = Score::new(row.score)
            .map_err(|e| RepositoryError::DataCorruption(format!("rating {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            account_id: row.account_id,
            store_id: row.store_id,
            score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoreRatingRow {
    #[sqlx(flatten)]
    rating: RatingRow,
    rater_name: String,
    rater_email: String,
}

impl TryFrom<StoreRatingRow> for StoreRating {
    type Error = RepositoryError;

    fn try_from(row: StoreRatingRow) -> Result<Self, Self::Error> {
        let rater_email = Email::parse(&row.rater_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            rating: row.rating.try_into()?,
            rater_name: row.rater_name,
            rater_email,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    account_count: i64,
    store_count: i64,
    rating_count: i64,
    rated_store_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the score for an (account, store) pair.
    ///
    /// A single `INSERT ... ON CONFLICT DO UPDATE` statement, so concurrent
    /// submissions for the same pair can never produce two rows. The last
    /// write wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ConstraintViolation` if the account or store
    /// no longer exists.
    pub async fn upsert(
        &self,
        account_id: AccountId,
        store_id: StoreId,
        score: Score,
    ) -> Result<Rating, RepositoryError> {
        let row = sqlx::query_as::<_, RatingRow>(
            r"
            INSERT INTO ratings (account_id, store_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_id, store_id)
            DO UPDATE SET score = EXCLUDED.score, updated_at = NOW()
            RETURNING id, account_id, store_id, score, created_at, updated_at
            ",
        )
        .bind(account_id)
        .bind(store_id)
        .bind(score)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get the rating an account left on a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is corrupt.
    pub async fn find_for_pair(
        &self,
        account_id: AccountId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, RepositoryError> {
        sqlx::query_as::<_, RatingRow>(
            r"
            SELECT id, account_id, store_id, score, created_at, updated_at
            FROM ratings
            WHERE account_id = $1 AND store_id = $2
            ",
        )
        .bind(account_id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?
        .map(Rating::try_from)
        .transpose()
    }

    /// List every rating for a store with the rater's name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is corrupt.
    pub async fn list_for_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<StoreRating>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRatingRow>(
            r"
            SELECT r.id, r.account_id, r.store_id, r.score, r.created_at, r.updated_at,
                   a.name AS rater_name, a.email AS rater_email
            FROM ratings r
            JOIN accounts a ON a.id = r.account_id
            WHERE r.store_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            ",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoreRating::try_from).collect()
    }

    /// Mean score for a store, or exactly `0.0` when it has no ratings.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn average_for_store(&self, store_id: StoreId) -> Result<f64, RepositoryError> {
        let average = sqlx::query_scalar::<_, f64>(
            "SELECT COALESCE(AVG(score), 0)::float8 FROM ratings WHERE store_id = $1",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(average)
    }

    /// Count accounts, stores, ratings, and rated stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn platform_stats(&self) -> Result<PlatformStats, RepositoryError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r"
            SELECT (SELECT COUNT(*) FROM accounts) AS account_count,
                   (SELECT COUNT(*) FROM stores) AS store_count,
                   (SELECT COUNT(*) FROM ratings) AS rating_count,
                   (SELECT COUNT(DISTINCT store_id) FROM ratings) AS rated_store_count
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(PlatformStats {
            account_count: row.account_count,
            store_count: row.store_count,
            rating_count: row.rating_count,
            rated_store_count: row.rated_store_count,
        })
    }
}
