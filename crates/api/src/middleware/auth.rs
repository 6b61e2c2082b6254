//! Principal resolution for protected routes.
//!
//! `RequireAuth` runs to completion before the handler body: it reads the
//! bearer token, verifies it, loads the user (with their cart) and hands the
//! user to the handler as a typed argument. Any failure ends the request with
//! a 401 and the handler never runs.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::db::with_deadline;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::TokenError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?;

        let user_id = state.tokens().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            let message = match e {
                TokenError::Expired => "Token expired",
                _ => "Invalid token",
            };
            AppError::Unauthenticated(message.to_string())
        })?;

        // Any lookup failure on this path is an authentication failure.
        let user = with_deadline(state.config().db_timeout, state.users().find_by_id(user_id))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, user_id = %user_id, "principal lookup failed");
                AppError::Unauthenticated("Invalid token".to_string())
            })?
            .ok_or_else(|| {
                tracing::debug!(user_id = %user_id, "token for deleted user");
                AppError::Unauthenticated("Invalid token".to_string())
            })?;

        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}
