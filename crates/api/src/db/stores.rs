//! Store repository for database operations.
//!
//! Every read that returns an average computes it in the same statement, so
//! no reader ever sees a stale aggregate.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use store_ratings_core::{AccountId, Email, Score, StoreId};

use super::{RepositoryError, like_pattern, optional_pattern};
use crate::models::{BrowsableStore, NewStore, Store, StoreFilter, StoreSummary};

// =============================================================================
// Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    name: String,
    email: String,
    address: String,
    owner_id: Option<AccountId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid store email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            address: row.address,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoreSummaryRow {
    #[sqlx(flatten)]
    store: StoreRow,
    owner_name: Option<String>,
    average_rating: f64,
    rating_count: i64,
}

impl TryFrom<StoreSummaryRow> for StoreSummary {
    type Error = RepositoryError;

    fn try_from(row: StoreSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            store: row.store.try_into()?,
            owner_name: row.owner_name,
            average_rating: row.average_rating,
            rating_count: row.rating_count,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BrowsableStoreRow {
    id: StoreId,
    name: String,
    address: String,
    average_rating: f64,
    rating_count: i64,
    user_rating: Option<i32>,
}

impl TryFrom<BrowsableStoreRow> for BrowsableStore {
    type Error = RepositoryError;

    fn try_from(row: BrowsableStoreRow) -> Result<Self, Self::Error> {
        let user_rating = row
            .user_rating
            .map(Score::new)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            address: row.address,
            average_rating: row.average_rating,
            rating_count: row.rating_count,
            user_rating,
        })
    }
}

// The summary projection shared by every aggregate read. Callers append
// WHERE / ORDER BY around the GROUP BY.
macro_rules! summary_query {
    ($where:literal, $order:literal) => {
        concat!(
            r"
            SELECT s.id, s.name, s.email, s.address, s.owner_id, s.created_at, s.updated_at,
                   o.name AS owner_name,
                   COALESCE(AVG(r.score), 0)::float8 AS average_rating,
                   COUNT(r.id) AS rating_count
            FROM stores s
            LEFT JOIN accounts o ON o.id = s.owner_id
            LEFT JOIN ratings r ON r.store_id = s.id
            ",
            $where,
            r"
            GROUP BY s.id, o.name
            ",
            $order,
        )
    };
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DuplicateKey` if the email is already taken.
    /// Returns `RepositoryError::ConstraintViolation` if the owner does not exist.
    pub async fn create(&self, store: NewStore<'_>) -> Result<Store, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, address, owner_id, created_at, updated_at
            ",
        )
        .bind(store.name.trim())
        .bind(store.email.as_str())
        .bind(store.address)
        .bind(store.owner_id)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Whether a store with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM stores WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Get a store with its owner name and average rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or the row is corrupt.
    pub async fn find_by_id(&self, id: StoreId) -> Result<Option<StoreSummary>, RepositoryError> {
        sqlx::query_as::<_, StoreSummaryRow>(summary_query!("WHERE s.id = $1", ""))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(StoreSummary::try_from)
            .transpose()
    }

    /// List stores matching a filter, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is corrupt.
    pub async fn list(&self, filter: &StoreFilter) -> Result<Vec<StoreSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreSummaryRow>(summary_query!(
            r"
            WHERE ($1::text IS NULL OR s.name ILIKE $1)
              AND ($2::text IS NULL OR s.email ILIKE $2)
              AND ($3::text IS NULL OR s.address ILIKE $3)
            ",
            "ORDER BY s.name ASC, s.id ASC"
        ))
        .bind(optional_pattern(filter.name.as_deref()))
        .bind(optional_pattern(filter.email.as_deref()))
        .bind(optional_pattern(filter.address.as_deref()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoreSummary::try_from).collect()
    }

    /// List the stores owned by an account, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is corrupt.
    pub async fn list_by_owner(
        &self,
        owner_id: AccountId,
    ) -> Result<Vec<StoreSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreSummaryRow>(summary_query!(
            "WHERE s.owner_id = $1",
            "ORDER BY s.id ASC"
        ))
        .bind(owner_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoreSummary::try_from).collect()
    }

    /// Stores whose name or address contains `term`, best rated first.
    ///
    /// Equal averages are ordered by store ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is corrupt.
    pub async fn search(&self, term: &str) -> Result<Vec<StoreSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreSummaryRow>(summary_query!(
            "WHERE s.name ILIKE $1 OR s.address ILIKE $1",
            "ORDER BY average_rating DESC, s.id ASC"
        ))
        .bind(like_pattern(term.trim()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(StoreSummary::try_from).collect()
    }

    /// Stores as seen by a rater, each with the rater's own score.
    ///
    /// Without a search term every store is listed by name. With one, only
    /// name or address matches are listed, best rated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails or a row is corrupt.
    pub async fn list_for_rater(
        &self,
        account_id: AccountId,
        search: Option<&str>,
    ) -> Result<Vec<BrowsableStore>, RepositoryError> {
        let rows = sqlx::query_as::<_, BrowsableStoreRow>(
            r"
            SELECT s.id, s.name, s.address,
                   COALESCE(AVG(r.score), 0)::float8 AS average_rating,
                   COUNT(r.id) AS rating_count,
                   mine.score AS user_rating
            FROM stores s
            LEFT JOIN ratings r ON r.store_id = s.id
            LEFT JOIN ratings mine ON mine.store_id = s.id AND mine.account_id = $1
            WHERE ($2::text IS NULL OR s.name ILIKE $2 OR s.address ILIKE $2)
            GROUP BY s.id, mine.score
            ORDER BY CASE WHEN $2::text IS NULL THEN s.name END ASC,
                     COALESCE(AVG(r.score), 0) DESC,
                     s.id ASC
            ",
        )
        .bind(account_id)
        .bind(optional_pattern(search))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(BrowsableStore::try_from).collect()
    }
}
