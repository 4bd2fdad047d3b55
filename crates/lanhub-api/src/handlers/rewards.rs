//! Rewards handlers.

use axum::Json;
use axum::extract::State;

use lanhub_service::RewardsSummary;

use crate::dto::request::RedeemRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/rewards/me
pub async fn my_rewards(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<RewardsSummary>>, ApiError> {
    let summary = state.rewards.summary(&auth).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// POST /api/rewards/redeem
pub async fn redeem(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RedeemRequest>,
) -> Result<Json<ApiResponse<RewardsSummary>>, ApiError> {
    let summary = state.rewards.redeem(&auth, req.points).await?;
    Ok(Json(ApiResponse::ok(summary)))
}
