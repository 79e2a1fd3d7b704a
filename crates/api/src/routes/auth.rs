//! Registration, login, and password change.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::ApiJson;
use crate::error::Result;
use crate::middleware::Authorized;
use crate::services::{AccountInput, AuthService, AuthSession, permission};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change form data.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Register a new `user` account and log it in.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<AccountInput>,
) -> Result<(StatusCode, Json<AuthSession>)> {
    let session = AuthService::new(state.pool(), state.tokens())
        .register(input)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Exchange email and password for a bearer token.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(form): ApiJson<LoginRequest>,
) -> Result<Json<AuthSession>> {
    let session = AuthService::new(state.pool(), state.tokens())
        .login(&form.email, &form.password)
        .await?;

    Ok(Json(session))
}

/// Change the caller's own password.
#[tracing::instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    Authorized { identity, .. }: Authorized<permission::ChangePassword>,
    ApiJson(form): ApiJson<ChangePasswordRequest>,
) -> Result<StatusCode> {
    AuthService::new(state.pool(), state.tokens())
        .change_password(identity.id, &form.current_password, &form.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
