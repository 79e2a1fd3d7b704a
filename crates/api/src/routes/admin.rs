//! Admin-only endpoints.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use store_ratings_core::{AccountId, Role};

use super::{ApiJson, ApiPath, ApiQuery};
use crate::error::Result;
use crate::middleware::Authorized;
use crate::models::{
    Account, AccountDetail, AccountFilter, PlatformStats, Store, StoreFilter, StoreSummary,
};
use crate::services::{AccountInput, AdminService, AuthService, StoreInput, permission};
use crate::state::AppState;

/// Admin account creation: the registration fields plus a role.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(flatten)]
    pub account: AccountInput,
    #[serde(default)]
    pub role: Role,
}

/// Platform-wide counters.
pub async fn stats(
    State(state): State<AppState>,
    _: Authorized<permission::ViewPlatformStats>,
) -> Result<Json<PlatformStats>> {
    Ok(Json(AdminService::new(state.pool()).stats().await?))
}

/// List accounts, optionally filtered.
pub async fn list_accounts(
    State(state): State<AppState>,
    _: Authorized<permission::ListAccounts>,
    ApiQuery(filter): ApiQuery<AccountFilter>,
) -> Result<Json<Vec<Account>>> {
    Ok(Json(
        AdminService::new(state.pool()).list_accounts(&filter).await?,
    ))
}

/// Create an account with any role.
#[tracing::instrument(skip_all)]
pub async fn create_account(
    State(state): State<AppState>,
    Authorized { identity: admin, .. }: Authorized<permission::CreateAccount>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    let account = AuthService::new(state.pool(), state.tokens())
        .create_account(request.account, request.role)
        .await?;

    tracing::info!(
        admin_id = %admin.id,
        account_id = %account.id,
        role = %account.role,
        "Admin created account"
    );
    Ok((StatusCode::CREATED, Json(account)))
}

/// One account, with owned stores for store owners.
pub async fn show_account(
    State(state): State<AppState>,
    _: Authorized<permission::ViewAccount>,
    ApiPath(id): ApiPath<AccountId>,
) -> Result<Json<AccountDetail>> {
    Ok(Json(AdminService::new(state.pool()).account_detail(id).await?))
}

/// List stores with owners and averages, optionally filtered.
pub async fn list_stores(
    State(state): State<AppState>,
    _: Authorized<permission::ListStores>,
    ApiQuery(filter): ApiQuery<StoreFilter>,
) -> Result<Json<Vec<StoreSummary>>> {
    Ok(Json(
        AdminService::new(state.pool()).list_stores(&filter).await?,
    ))
}

/// Create a store.
#[tracing::instrument(skip_all)]
pub async fn create_store(
    State(state): State<AppState>,
    _: Authorized<permission::CreateStore>,
    ApiJson(input): ApiJson<StoreInput>,
) -> Result<(StatusCode, Json<Store>)> {
    let store = AdminService::new(state.pool()).create_store(&input).await?;
    Ok((StatusCode::CREATED, Json(store)))
}
