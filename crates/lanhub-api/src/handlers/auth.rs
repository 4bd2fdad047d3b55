//! Auth handlers: register, login, me.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use lanhub_service::{LoginRequest, LoginResponse, Profile, RegisterRequest};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Profile>>), ApiError> {
    let profile = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(profile))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let response = state.accounts.login(req).await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let profile = state.accounts.me(&auth).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
