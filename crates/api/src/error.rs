//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Service errors are folded into
//! one taxonomy here, and each variant maps to exactly one status code and a
//! JSON body of the form `{"error": kind, "message": text, "fields": [...]}`.
//! Server-side failures are captured to Sentry before responding; the client
//! only sees a generic message for those.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use store_ratings_core::{FieldError, InvalidScore, ValidationErrors};

use crate::db::RepositoryError;
use crate::services::{AccessError, AdminError, AuthError, RatingError, TokenError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid credential accompanied the request.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller's role may not perform the operation.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique value is already taken.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Rating score outside `1..=5`.
    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),

    /// A reference or check constraint would be broken.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// One or more fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The request body, query, or path could not be parsed.
    #[error("Malformed request: {0}")]
    Malformed(String),

    /// The database did not answer in time.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "no_fields")]
    fields: &'a [FieldError],
}

#[allow(clippy::trivially_copy_pass_by_ref)] // signature required by serde
fn no_fields(fields: &&[FieldError]) -> bool {
    fields.is_empty()
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateKey(_)
            | Self::InvalidScore(_)
            | Self::ConstraintViolation(_)
            | Self::Validation(_)
            | Self::Malformed(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable kind, used as the `error` field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::InvalidScore(_) => "invalid_score",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::Validation(_) => "validation",
            Self::Malformed(_) => "malformed",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Unauthenticated(msg)
            | Self::NotFound(msg)
            | Self::DuplicateKey(msg)
            | Self::ConstraintViolation(msg)
            | Self::Malformed(msg) => msg.clone(),
            // Never reveal whether the target exists.
            Self::Forbidden => "you do not have permission to perform this action".to_string(),
            Self::InvalidScore(err) => err.to_string(),
            Self::Validation(_) => "validation failed".to_string(),
            Self::Unavailable(_) => "service temporarily unavailable, please retry".to_string(),
            Self::Internal(_) => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Unavailable(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let fields = match &self {
            Self::Validation(errors) => errors.errors(),
            _ => &[],
        };

        let body = ErrorBody {
            error: self.kind(),
            message: self.client_message(),
            fields,
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Conversions from layer errors
// =============================================================================

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateKey(_) => {
                Self::DuplicateKey("a record with this value already exists".to_string())
            }
            RepositoryError::ConstraintViolation(constraint) => {
                Self::ConstraintViolation(format!("constraint {constraint} would be violated"))
            }
            RepositoryError::Unavailable(e) => Self::Unavailable(e.to_string()),
            err @ (RepositoryError::DataCorruption(_) | RepositoryError::Database(_)) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => Self::Unauthenticated(err.to_string()),
            AccessError::Forbidden => Self::Forbidden,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(errors) => Self::Validation(errors),
            AuthError::InvalidCredentials | AuthError::AccountNotFound => {
                Self::Unauthenticated(err.to_string())
            }
            AuthError::EmailTaken => Self::DuplicateKey(err.to_string()),
            AuthError::Token(TokenError::Expired | TokenError::Malformed) => {
                Self::Unauthenticated(err.to_string())
            }
            AuthError::Token(TokenError::Signing(_)) | AuthError::PasswordHash => {
                Self::Internal(err.to_string())
            }
            AuthError::Repository(e) => e.into(),
        }
    }
}

impl From<RatingError> for AppError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::InvalidScore(e) => Self::InvalidScore(e),
            RatingError::StoreNotFound | RatingError::NoStoreOwned => {
                Self::NotFound(err.to_string())
            }
            RatingError::Repository(e) => e.into(),
        }
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(errors) => Self::Validation(errors),
            AdminError::EmailTaken => Self::DuplicateKey(err.to_string()),
            AdminError::InvalidOwner(_) => Self::ConstraintViolation(err.to_string()),
            AdminError::AccountNotFound => Self::NotFound(err.to_string()),
            AdminError::Repository(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

/// Set the Sentry user context for the authenticated caller.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use store_ratings_core::Score;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DuplicateKey("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidScore(Score::new(6).unwrap_err()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ConstraintViolation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Malformed("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Unavailable("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::new("name", "too short"));
        errors.push(FieldError::new("password", "too weak"));

        let (status, body) = body_json(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");
        assert_eq!(body["fields"][0]["field"], "name");
        assert_eq!(body["fields"][1]["field"], "password");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) =
            body_json(AppError::Internal("connection reset by 10.0.0.3".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
        assert!(body.get("fields").is_none());
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let unknown = AppError::from(AuthError::InvalidCredentials);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.client_message(), "invalid credentials");
    }

    #[test]
    fn test_repository_errors_map_to_taxonomy() {
        assert!(matches!(
            AppError::from(RepositoryError::DuplicateKey("accounts_email_key".into())),
            AppError::DuplicateKey(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Unavailable(sqlx::Error::PoolTimedOut)),
            AppError::Unavailable(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::DataCorruption("bad".into())),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_no_store_is_not_found() {
        let err = AppError::from(RatingError::NoStoreOwned);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.client_message(), "no store found for this owner");
    }
}
