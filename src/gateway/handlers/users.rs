//! User registration and login handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use validator::Validate;

use crate::user_auth::AuthError;
use crate::user_auth::service::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse};

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResult, created};

/// POST /users
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_err();
    }

    let auth = state
        .user_auth
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Auth service unavailable"))?;

    match auth.register(&req).await {
        Ok(resp) => created(resp),
        Err(AuthError::EmailTaken) => {
            ApiError::bad_request("email is already registered").into_err()
        }
        Err(e) => {
            tracing::error!(error = %e, "User registration failed");
            ApiError::internal("could not register user").into_err()
        }
    }
}

/// POST /users/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    if let Err(e) = req.validate() {
        return ApiError::bad_request(e.to_string()).into_err();
    }

    let auth = state
        .user_auth
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Auth service unavailable"))?;

    match auth.login(&req).await {
        Ok(resp) => created(resp),
        Err(AuthError::InvalidCredentials) => {
            ApiError::bad_request(AuthError::InvalidCredentials.to_string()).into_err()
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            ApiError::internal("could not log in").into_err()
        }
    }
}
