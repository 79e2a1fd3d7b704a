//! Bearer-token authentication extractors.
//!
//! [`Caller`] resolves the `Authorization: Bearer <token>` header to the
//! caller's current identity. A missing header is not an error there; it
//! yields an anonymous caller.
//!
//! [`Authorized`] builds on it and refuses the request during head
//! extraction, before any path, query, or body extractor listed after it in
//! the handler's arguments gets to run.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, set_sentry_user};
use crate::models::Identity;
use crate::services::{AuthService, Permission, authorize};
use crate::state::AppState;

/// The (possibly anonymous) caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

/// A caller allowed to perform the operation named by `P`.
///
/// Rejects with `401` for an anonymous caller and `403` for a caller whose
/// role is not permitted.
///
/// # Example
///
/// ```rust,ignore
/// async fn create_store(
///     State(state): State<AppState>,
///     Authorized { identity, .. }: Authorized<permission::CreateStore>,
///     ApiJson(input): ApiJson<StoreInput>,
/// ) -> Result<(StatusCode, Json<Store>)> {
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authorized<P> {
    pub identity: Identity,
    permission: PhantomData<fn() -> P>,
}

/// Extract the token from an `Authorization: Bearer` header.
///
/// `Ok(None)` when the header is absent; an error when it is present but
/// not a bearer credential.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("expected a bearer token".to_string()))?;

    Ok(Some(token))
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers)? else {
            return Ok(Self(None));
        };

        let identity = AuthService::new(state.pool(), state.tokens())
            .authenticate(token)
            .await?;

        tracing::Span::current().record("account_id", identity.id.as_i32());
        set_sentry_user(&identity.id, Some(identity.email.as_str()));

        Ok(Self(Some(identity)))
    }
}

impl<P: Permission> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Caller(caller) = Caller::from_request_parts(parts, state).await?;
        let identity = authorize(caller.as_ref(), P::OPERATION)?.clone();

        Ok(Self {
            identity,
            permission: PhantomData,
        })
    }
}
