//! Request-ending errors, reported to Sentry.
//!
//! Shopper mistakes never reach this type: handlers turn them into notices
//! or re-rendered forms. `AppError` is what's left when the shop itself
//! failed: the store, the session, or password hashing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::auth::AuthError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Shop store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication failed in a way the shopper can't fix.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::UserAlreadyExists) => StatusCode::CONFLICT,
            Self::Auth(err) if !err.is_internal() => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Session(_) | Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
            return (status, "Internal server error").into_response();
        }

        let message = match &self {
            Self::Auth(err) => err.to_string(),
            _ => self.to_string(),
        };
        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Tag Sentry reports with the logged-in shopper.
pub fn set_sentry_user(username: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Stop tagging Sentry reports after logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::PasswordHash).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Storage(StorageError::NotFound("orders".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = AppError::Storage(StorageError::Conflict("ORD-1".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(response).await, "Internal server error");
    }

    #[tokio::test]
    async fn test_shopper_errors_are_shown() {
        let response = AppError::Auth(AuthError::InvalidCredentials).into_response();
        assert_eq!(body(response).await, "Invalid username or password");
    }
}
