//! Maintenance handlers.

use axum::Json;
use axum::extract::State;
use tracing::info;

use crate::dto::response::{ApiResponse, SweepResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/maintenance/sweep
pub async fn sweep(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<SweepResponse>>, ApiError> {
    auth.require_admin()?;
    let report = state.sweeper.sweep(None).await?;
    info!(
        user_id = %auth.user_id,
        booths_released = report.booths_released,
        reservations_closed = report.reservations_closed,
        "Maintenance sweep requested"
    );
    Ok(Json(ApiResponse::ok(report.into())))
}
