//! Rating domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use store_ratings_core::{AccountId, Email, RatingId, Score, StoreId};

use super::store::StoreSummary;

/// One account's score for one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rating {
    pub id: RatingId,
    pub account_id: AccountId,
    pub store_id: StoreId,
    pub score: Score,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A rating annotated with who left it, as shown to the store's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreRating {
    #[serde(flatten)]
    pub rating: Rating,
    pub rater_name: String,
    pub rater_email: Email,
}

/// One owned store with every rating left on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnedStoreRatings {
    pub store: StoreSummary,
    pub ratings: Vec<StoreRating>,
}
