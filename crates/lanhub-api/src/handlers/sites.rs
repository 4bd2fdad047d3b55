//! Site catalog and plan handlers.

use axum::Json;
use axum::extract::{Path, State};

use lanhub_entity::booth::Booth;
use lanhub_service::{PlanCatalog, SeedReport, SiteDetail, SiteOverview};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/sites
pub async fn list_sites(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SiteOverview>>>, ApiError> {
    let sites = state.catalog.list_sites().await?;
    Ok(Json(ApiResponse::ok(sites)))
}

/// GET /api/sites/{slug}
pub async fn get_site(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<SiteDetail>>, ApiError> {
    let site = state.catalog.get_site(&slug).await?;
    Ok(Json(ApiResponse::ok(site)))
}

/// POST /api/sites/seed
pub async fn seed_sites(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<SeedReport>>, ApiError> {
    let report = state.catalog.seed_catalog(&auth).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/sites/{slug}/reset-booths
pub async fn reset_booths(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<Booth>>>, ApiError> {
    let booths = state.catalog.reset_site_booths(&auth, &slug).await?;
    Ok(Json(ApiResponse::ok(booths)))
}

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> Json<ApiResponse<PlanCatalog>> {
    Json(ApiResponse::ok(state.catalog.list_plans()))
}
