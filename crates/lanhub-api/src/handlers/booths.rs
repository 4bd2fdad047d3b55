//! Booth registry handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use lanhub_core::types::BoothId;
use lanhub_service::{BoothListing, BoothView, ReleaseReport};

use crate::dto::request::{BoothQuery, ReleaseBoothsRequest, SetBoothStateRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// GET /api/booths?siteId=
pub async fn list_booths(
    State(state): State<AppState>,
    Query(query): Query<BoothQuery>,
) -> Result<Json<ApiResponse<BoothListing>>, ApiError> {
    let listing = state.booths.list_booths(query.site_id.as_deref()).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

/// GET /api/booths/{id}
pub async fn get_booth(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BoothView>>, ApiError> {
    let id: BoothId = parse_id(&id)?;
    let booth = state.booths.get_booth(id).await?;
    Ok(Json(ApiResponse::ok(booth)))
}

/// POST /api/booths/release
pub async fn release_booths(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ReleaseBoothsRequest>,
) -> Result<Json<ApiResponse<ReleaseReport>>, ApiError> {
    let report = state
        .booths
        .release_booths(&auth, &req.booth_numbers, req.site_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// PUT /api/booths/{id}/state
pub async fn set_booth_state(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SetBoothStateRequest>,
) -> Result<Json<ApiResponse<BoothView>>, ApiError> {
    let id: BoothId = parse_id(&id)?;
    let booth = state.booths.set_state(&auth, id, req.state).await?;
    Ok(Json(ApiResponse::ok(booth)))
}
