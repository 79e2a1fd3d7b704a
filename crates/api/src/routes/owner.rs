//! Store owner dashboard.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::Authorized;
use crate::models::OwnedStoreRatings;
use crate::services::{RatingService, permission};
use crate::state::AppState;

/// Every store the caller owns, with its average and its ratings.
///
/// Responds 404 when the caller owns no store.
pub async fn dashboard(
    State(state): State<AppState>,
    Authorized { identity, .. }: Authorized<permission::ViewOwnStoreRatings>,
) -> Result<Json<Vec<OwnedStoreRatings>>> {
    let dashboard = RatingService::new(state.pool())
        .owner_dashboard(identity.id)
        .await?;
    Ok(Json(dashboard))
}
