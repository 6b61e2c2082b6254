//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. Failures render as
//! `{"error": "<message>"}` with the matching status code; server errors are
//! captured to Sentry and their details never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ServiceError;
use crate::services::auth::AuthError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Registration or login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart or product operation failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Malformed or semantically invalid request.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, invalid or expired bearer token.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
}

impl AppError {
    /// The status code and client-facing message for this error.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) | Self::Service(ServiceError::Repository(err)) => repository(err),
            Self::Auth(err) => auth(err),
            Self::Service(ServiceError::Validation(msg)) | Self::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Self::Service(ServiceError::NotFound(resource)) => {
                (StatusCode::NOT_FOUND, capitalize(&format!("{resource} not found")))
            }
            Self::Service(ServiceError::Forbidden) => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            Self::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn repository(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::InvalidReference(_) => (
            StatusCode::BAD_REQUEST,
            "Referenced entity does not exist".to_string(),
        ),
        RepositoryError::Conflict(msg) => (StatusCode::BAD_REQUEST, capitalize(msg)),
        RepositoryError::InvalidValue(_) => (
            StatusCode::BAD_REQUEST,
            "Value out of range for its field".to_string(),
        ),
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Database(_)
        | RepositoryError::DataCorruption(_)
        | RepositoryError::DeadlineExceeded(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

fn auth(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ),
        AuthError::UserAlreadyExists => (
            StatusCode::BAD_REQUEST,
            "An account with this email already exists".to_string(),
        ),
        AuthError::InvalidEmail(e) => (StatusCode::BAD_REQUEST, format!("Invalid email address: {e}")),
        AuthError::InvalidUsername(msg) => (StatusCode::BAD_REQUEST, capitalize(msg)),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, capitalize(msg)),
        AuthError::Repository(err) => repository(err),
        AuthError::Token(_) | AuthError::PasswordHash => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated principal.
///
/// Call this after successful authentication to associate errors with users.
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
    use std::time::Duration;

    use http_body_util::BodyExt;

    use super::*;
    use crate::services::auth::TokenError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("no".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Service(ServiceError::Forbidden)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Service(ServiceError::NotFound("product"))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::InvalidReference(
                "fk".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Service(ServiceError::Repository(
                RepositoryError::InvalidValue("products_price_check".to_string())
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DeadlineExceeded(
                Duration::from_secs(3)
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::Token(TokenError::Signing))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_body_is_json_error() {
        let response = AppError::Service(ServiceError::NotFound("cart item")).into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": "Cart item not found" }));
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let response =
            AppError::Database(RepositoryError::DataCorruption("row 7 broken".to_string()))
                .into_response();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], INTERNAL_MESSAGE);
    }
}
