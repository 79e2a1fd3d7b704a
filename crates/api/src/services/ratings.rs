//! Rating aggregation.
//!
//! Each (account, store) pair holds at most one rating, enforced by a unique
//! constraint and written with a single upsert. Averages are computed by the
//! database on every read.

use sqlx::PgPool;
use thiserror::Error;

use store_ratings_core::{AccountId, InvalidScore, Score, StoreId};

use crate::db::ratings::STORE_FOREIGN_KEY;
use crate::db::{RatingRepository, RepositoryError, StoreRepository};
use crate::models::{BrowsableStore, OwnedStoreRatings, Rating, StoreSummary};

/// Errors from rating operations.
#[derive(Debug, Error)]
pub enum RatingError {
    /// Score outside `1..=5`.
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),

    /// The store does not exist (or was deleted mid-request).
    #[error("store not found")]
    StoreNotFound,

    /// The caller owns no store.
    #[error("no store found for this owner")]
    NoStoreOwned,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Rating aggregation service.
pub struct RatingService<'a> {
    ratings: RatingRepository<'a>,
    stores: StoreRepository<'a>,
}

impl<'a> RatingService<'a> {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            ratings: RatingRepository::new(pool),
            stores: StoreRepository::new(pool),
        }
    }

    /// Create or replace the caller's rating for a store.
    ///
    /// Resubmitting overwrites the score in place; concurrent submissions for
    /// the same pair leave exactly one row holding the last write.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::InvalidScore` before touching storage if `score`
    /// is outside `1..=5`.
    /// Returns `RatingError::StoreNotFound` if the store does not exist.
    pub async fn submit_rating(
        &self,
        account_id: AccountId,
        store_id: StoreId,
        score: i32,
    ) -> Result<Rating, RatingError> {
        let score = Score::new(score)?;

        if !self.stores.exists(store_id).await? {
            return Err(RatingError::StoreNotFound);
        }

        let rating = self
            .ratings
            .upsert(account_id, store_id, score)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(ref constraint)
                    if constraint == STORE_FOREIGN_KEY =>
                {
                    RatingError::StoreNotFound
                }
                other => RatingError::Repository(other),
            })?;

        tracing::info!(
            account_id = %account_id,
            store_id = %store_id,
            score = %rating.score,
            "Rating submitted"
        );
        Ok(rating)
    }

    /// Mean score for a store; exactly `0.0` when it has no ratings.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::StoreNotFound` if the store does not exist.
    pub async fn average_rating(&self, store_id: StoreId) -> Result<f64, RatingError> {
        if !self.stores.exists(store_id).await? {
            return Err(RatingError::StoreNotFound);
        }
        Ok(self.ratings.average_for_store(store_id).await?)
    }

    /// The caller's own rating for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::StoreNotFound` if the store does not exist.
    pub async fn rating_for(
        &self,
        account_id: AccountId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, RatingError> {
        if !self.stores.exists(store_id).await? {
            return Err(RatingError::StoreNotFound);
        }
        Ok(self.ratings.find_for_pair(account_id, store_id).await?)
    }

    /// A single store with its average.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::StoreNotFound` if the store does not exist.
    pub async fn view_store(&self, store_id: StoreId) -> Result<StoreSummary, RatingError> {
        self.stores
            .find_by_id(store_id)
            .await?
            .ok_or(RatingError::StoreNotFound)
    }

    /// The store list as seen by `account_id`, each with their own score.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::Repository` if the query fails.
    pub async fn browse(
        &self,
        account_id: AccountId,
        search: Option<&str>,
    ) -> Result<Vec<BrowsableStore>, RatingError> {
        Ok(self.stores.list_for_rater(account_id, search).await?)
    }

    /// Stores whose name or address contains `term`, best rated first.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::Repository` if the query fails.
    pub async fn search_stores(&self, term: &str) -> Result<Vec<StoreSummary>, RatingError> {
        Ok(self.stores.search(term).await?)
    }

    /// Every store owned by `owner_id` with its average and ratings.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::NoStoreOwned` if the owner has no store.
    pub async fn owner_dashboard(
        &self,
        owner_id: AccountId,
    ) -> Result<Vec<OwnedStoreRatings>, RatingError> {
        let stores = self.stores.list_by_owner(owner_id).await?;
        if stores.is_empty() {
            return Err(RatingError::NoStoreOwned);
        }

        let mut dashboard = Vec::with_capacity(stores.len());
        for store in stores {
            let ratings = self.ratings.list_for_store(store.store.id).await?;
            dashboard.push(OwnedStoreRatings { store, ratings });
        }
        Ok(dashboard)
    }
}
