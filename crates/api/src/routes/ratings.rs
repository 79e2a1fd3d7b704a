//! Rating submission for `user` accounts.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use store_ratings_core::StoreId;

use super::{ApiJson, ApiPath};
use crate::error::Result;
use crate::middleware::Authorized;
use crate::models::Rating;
use crate::services::{RatingService, permission};
use crate::state::AppState;

/// Rating submission. `rating` is accepted as an alias for `score`.
///
/// The score is taken as a plain integer so that out-of-range values reach
/// the service and are reported as `invalid_score`.
#[derive(Debug, Deserialize)]
pub struct SubmitRatingRequest {
    pub store_id: StoreId,
    #[serde(alias = "rating")]
    pub score: i32,
}

/// The caller's rating for one store plus the store's current average.
#[derive(Debug, Serialize)]
pub struct OwnRating {
    pub store_id: StoreId,
    pub rating: Option<Rating>,
    pub average_rating: f64,
}

/// Create or replace the caller's rating. Safe to retry.
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Authorized { identity, .. }: Authorized<permission::SubmitRating>,
    ApiJson(request): ApiJson<SubmitRatingRequest>,
) -> Result<Json<OwnRating>> {
    let service = RatingService::new(state.pool());

    let rating = service
        .submit_rating(identity.id, request.store_id, request.score)
        .await?;
    let average_rating = service.average_rating(request.store_id).await?;

    Ok(Json(OwnRating {
        store_id: request.store_id,
        rating: Some(rating),
        average_rating,
    }))
}

/// The caller's own rating for a store, if any.
pub async fn show_own(
    State(state): State<AppState>,
    Authorized { identity, .. }: Authorized<permission::ViewOwnRating>,
    ApiPath(store_id): ApiPath<StoreId>,
) -> Result<Json<OwnRating>> {
    let service = RatingService::new(state.pool());

    let rating = service.rating_for(identity.id, store_id).await?;
    let average_rating = service.average_rating(store_id).await?;

    Ok(Json(OwnRating {
        store_id,
        rating,
        average_rating,
    }))
}
