//! Store domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use store_ratings_core::{AccountId, Email, Score, StoreId};

/// A store (domain type).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    /// Owning account, if any.
    pub owner_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A store annotated with its owner and its read-time average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    #[serde(flatten)]
    pub store: Store,
    /// Display name of the owning account.
    pub owner_name: Option<String>,
    /// Mean of all scores; exactly `0.0` when the store has no ratings.
    pub average_rating: f64,
    /// Number of ratings the average was computed from.
    pub rating_count: i64,
}

/// A store as listed to a rater, with the caller's own score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowsableStore {
    pub id: StoreId,
    pub name: String,
    pub address: String,
    pub average_rating: f64,
    pub rating_count: i64,
    /// The caller's current score for this store, if they rated it.
    pub user_rating: Option<Score>,
}

/// Input for inserting a store. Fields are already validated.
#[derive(Debug, Clone, Copy)]
pub struct NewStore<'a> {
    pub name: &'a str,
    pub email: &'a Email,
    pub address: &'a str,
    pub owner_id: Option<AccountId>,
}

/// Filters for the admin store listing. All fields are case-insensitive
/// substring matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}
