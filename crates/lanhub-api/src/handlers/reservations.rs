//! Reservation handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use lanhub_core::error::AppError;
use lanhub_core::types::ReservationId;
use lanhub_entity::reservation::Reservation;

use crate::dto::request::{CancelRequest, CreateReservationRequest, ExtendRequest, ReservationQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson, parse_id};
use crate::state::AppState;

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), ApiError> {
    let reservation = state.reservations.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reservation))))
}

/// GET /api/reservations?userId=
pub async fn list_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ReservationQuery>,
) -> Result<Json<ApiResponse<Vec<Reservation>>>, ApiError> {
    let reservations = state
        .reservations
        .list_for_user(&auth, query.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(reservations)))
}

/// GET /api/reservations/{id}
///
/// Accepts the reservation id or its code.
pub async fn get_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let reservation = state.reservations.get(&auth, &reference).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/{id}/extend
pub async fn extend_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ExtendRequest>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let id: ReservationId = parse_id(&id)?;
    let reservation = state.reservations.extend(&auth, id, &req.plan_id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/{id}/cancel
pub async fn cancel_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let id: ReservationId = parse_id(&id)?;
    // The body is optional; an empty one cancels without a reason.
    let req: CancelRequest = if body.is_empty() {
        CancelRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?
    };
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;
    let reservation = state.reservations.cancel(&auth, id, req.reason).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/{id}/check-in
pub async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let id: ReservationId = parse_id(&id)?;
    let reservation = state.reservations.check_in(&auth, id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/{id}/expire
pub async fn expire_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let id: ReservationId = parse_id(&id)?;
    let reservation = state.reservations.mark_expired(&auth, id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}
