//! HTTP route handlers.
//!
//! Handlers are thin: extract, authorize, call one service, serialize.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (database ping)
//!
//! # Auth
//! POST /api/auth/register            - Register (public, role forced to user)
//! POST /api/auth/login               - Login (public)
//! PUT  /api/auth/change-password     - Change own password (any role)
//!
//! # Admin (admin only)
//! GET  /api/admin/dashboard/stats    - Platform counters
//! GET  /api/admin/accounts           - List accounts (?name&email&address&role)
//! POST /api/admin/accounts           - Create account with any role
//! GET  /api/admin/accounts/{id}      - Account detail (+ stores for owners)
//! GET  /api/admin/stores             - List stores (?name&email&address)
//! POST /api/admin/stores             - Create store
//!
//! # Stores (any role)
//! GET  /api/stores                   - Browse with own rating (?search)
//! GET  /api/stores/search            - Search, best rated first (?q)
//! GET  /api/stores/{id}              - Store with average
//!
//! # Ratings (user only)
//! POST /api/ratings                  - Submit or replace a rating
//! GET  /api/ratings/{store_id}       - Own rating for a store
//!
//! # Store owner (store_owner only)
//! GET  /api/store-owner/ratings      - Owned stores with their ratings
//! ```

pub mod admin;
pub mod auth;
pub mod owner;
pub mod ratings;
pub mod stores;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::{StatusCode, request::Parts},
    middleware,
    routing::{get, post, put},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

// =============================================================================
// Extractors with JSON error bodies
// =============================================================================

/// `Json<T>` whose rejection is an [`AppError::Malformed`] JSON body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T> FromRequest<AppState> for ApiJson<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Query<T>` whose rejection is an [`AppError::Malformed`] JSON body.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<T> FromRequestParts<AppState> for ApiQuery<T>
where
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// `Path<T>` whose rejection is an [`AppError::Malformed`] JSON body.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<T> FromRequestParts<AppState> for ApiPath<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/change-password", put(auth::change_password))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(admin::stats))
        .route(
            "/accounts",
            get(admin::list_accounts).post(admin::create_account),
        )
        .route("/accounts/{id}", get(admin::show_account))
        .route("/stores", get(admin::list_stores).post(admin::create_store))
}

/// Create the store browsing routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::index))
        .route("/search", get(stores::search))
        .route("/{id}", get(stores::show))
}

/// Create the rating routes router.
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(ratings::submit))
        .route("/{store_id}", get(ratings::show_own))
}

/// Create all `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
        .nest("/stores", store_routes())
        .nest("/ratings", rating_routes())
        .route("/store-owner/ratings", get(owner::dashboard))
}

/// The full application router with health checks and request IDs.
///
/// Tracing, CORS, and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", routes())
        .fallback(not_found)
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("no such route".to_string())
}
