//! Store browsing for every authenticated role.

use axum::{Json, extract::State};
use serde::Deserialize;

use store_ratings_core::StoreId;

use super::{ApiPath, ApiQuery};
use crate::error::Result;
use crate::middleware::Authorized;
use crate::models::{BrowsableStore, StoreSummary};
use crate::services::{RatingService, permission};
use crate::state::AppState;

/// `?search=` for the store list.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams {
    pub search: Option<String>,
}

/// `?q=` for store search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Every store (or the matches for `search`), with the caller's own score.
pub async fn index(
    State(state): State<AppState>,
    Authorized { identity, .. }: Authorized<permission::BrowseStores>,
    ApiQuery(params): ApiQuery<BrowseParams>,
) -> Result<Json<Vec<BrowsableStore>>> {
    let stores = RatingService::new(state.pool())
        .browse(identity.id, params.search.as_deref())
        .await?;
    Ok(Json(stores))
}

/// Name or address matches, best rated first.
pub async fn search(
    State(state): State<AppState>,
    _: Authorized<permission::BrowseStores>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<StoreSummary>>> {
    let stores = RatingService::new(state.pool())
        .search_stores(&params.q)
        .await?;
    Ok(Json(stores))
}

/// One store with its average.
pub async fn show(
    State(state): State<AppState>,
    _: Authorized<permission::ViewStore>,
    ApiPath(id): ApiPath<StoreId>,
) -> Result<Json<StoreSummary>> {
    Ok(Json(RatingService::new(state.pool()).view_store(id).await?))
}
