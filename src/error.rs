use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Why a presented credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Missing,
    Expired,
    Malformed,
    UnknownUser,
    BadCredentials,
}

impl AuthFailure {
    pub fn reason(self) -> &'static str {
        match self {
            AuthFailure::Missing => "missing",
            AuthFailure::Expired => "expired",
            AuthFailure::Malformed => "malformed",
            AuthFailure::UnknownUser => "unknown-user",
            AuthFailure::BadCredentials => "bad-credentials",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("permission denied: {0}")]
    Permission(&'static str),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(&'static str),

    #[error("invariant violation: {0}")]
    Invariant(&'static str),

    #[error("authentication failed: {}", .0.reason())]
    Authentication(AuthFailure),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Invariant(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Permission(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Database(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Permission(_) => "PERMISSION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Invariant(_) => "INVARIANT_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_FAULT",
            AppError::Config(_) | AppError::Database(_) | AppError::Internal => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Store failures roll back the transaction that raised them; the caller
        // only ever sees a generic failure, never partial state.
        let message = match &self {
            AppError::Config(_) | AppError::Database(_) | AppError::Internal => {
                tracing::error!(error = %self, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({ "error": message, "code": self.code() }));
        (status, body).into_response()
    }
}

/// Composite-key membership tables resolve duplicate-insert races by surfacing
/// a conflict instead of corrupting state.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
                || matches!(db.code().as_deref(), Some("1555") | Some("2067"))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Permission("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotFound("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Invariant("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Authentication(AuthFailure::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_failure_reasons_are_stable() {
        assert_eq!(AuthFailure::Expired.reason(), "expired");
        assert_eq!(AuthFailure::Malformed.reason(), "malformed");
        assert_eq!(AuthFailure::UnknownUser.reason(), "unknown-user");
    }
}
