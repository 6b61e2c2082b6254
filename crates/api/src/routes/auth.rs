//! Registration and login.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::UserRole;

use super::extract::ValidJson;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Registration payload.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "type")]
    pub role: String,
}

/// Registration result.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Login payload. Email is the login key.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login result.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Create an account.
#[instrument(skip_all, fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let role: UserRole = body
        .role
        .parse()
        .map_err(|e: bazaar_core::RoleError| AppError::Validation(e.to_string()))?;

    let registered = state
        .auth()
        .register(&body.username, &body.email, &body.password, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            username: registered.user.username,
            email: registered.user.email.into_inner(),
            token: registered.token,
        }),
    ))
}

/// Exchange email and password for a token.
#[instrument(skip_all, fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let authenticated = state.auth().login(&body.email, &body.password).await?;

    Ok(Json(LoginResponse {
        token: authenticated.token,
    }))
}
