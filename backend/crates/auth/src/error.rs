//! Auth Error Types
//!
//! Expected outcomes (duplicates, unknown user, bad password, no session)
//! are ordinary variants returned through [`AuthResult`]. Anything a
//! collaborator did wrong is `Database` or `Internal` and is rendered to
//! callers only as a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::repository::UniqueKey;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration: username taken
    #[error("Username already exists")]
    DuplicateUsername,

    /// Registration: email taken
    #[error("Email already exists")]
    DuplicateEmail,

    /// Login: no account has that username
    #[error("User not found")]
    UserNotFound,

    /// Login: password does not match
    #[error("Invalid password")]
    InvalidCredentials,

    /// Login failure with the cause withheld
    #[error("Invalid credentials")]
    LoginRejected,

    /// Lookup by id or username found nothing
    #[error("User not found")]
    AccountNotFound,

    /// No live session for this request
    #[error("User not authenticated")]
    Unauthenticated,

    /// Request input rejected before reaching the store
    #[error("{0}")]
    Validation(String),

    /// Store rejected a write that would break a uniqueness invariant
    #[error("Unique constraint violated on {0}")]
    UniqueViolation(UniqueKey),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::DuplicateUsername
            | AuthError::DuplicateEmail
            | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::UserNotFound
            | AuthError::InvalidCredentials
            | AuthError::LoginRejected
            | AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            // Reaching the boundary means the use case failed to translate it
            AuthError::UniqueViolation(_) => ErrorKind::Conflict,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether this is a collaborator malfunction rather than an expected outcome
    pub fn is_internal(&self) -> bool {
        self.kind().is_server_error()
    }

    /// Convert to AppError
    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::Database(e) => AppError::from(e),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::UserNotFound | AuthError::InvalidCredentials | AuthError::LoginRejected => {
                tracing::warn!(error = %self, "Failed login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.is_client_error() {
            AuthError::Validation(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::from(rejection).into()
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_boundary_table() {
        let cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::DuplicateUsername, StatusCode::BAD_REQUEST),
            (AuthError::DuplicateEmail, StatusCode::BAD_REQUEST),
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::UserNotFound, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::LoginRejected, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AuthError::AccountNotFound, StatusCode::NOT_FOUND),
            (
                AuthError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AuthError::DuplicateUsername.to_string(),
            "Username already exists"
        );
        assert_eq!(AuthError::DuplicateEmail.to_string(), "Email already exists");
        assert_eq!(AuthError::InvalidCredentials.to_string(), "Invalid password");
        assert_eq!(
            AuthError::Unauthenticated.to_string(),
            "User not authenticated"
        );
    }

    #[test]
    fn test_internal_detail_is_not_public() {
        let app_err = AuthError::Internal("pool exploded at 10.1.2.3".into()).into_app_error();
        assert!(app_err.is_server_error());
        assert!(!app_err.public_message().contains("10.1.2.3"));
    }

    #[test]
    fn test_client_app_error_becomes_validation() {
        let err: AuthError = AppError::bad_request("Email cannot be empty").into();
        assert!(matches!(err, AuthError::Validation(ref m) if m == "Email cannot be empty"));

        let err: AuthError = AppError::internal("x").into();
        assert!(err.is_internal());
    }
}
