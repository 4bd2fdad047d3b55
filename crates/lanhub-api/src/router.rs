//! Route definitions for the LanHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::Router;
use axum::routing::{get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route, bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(site_routes())
        .merge(booth_routes())
        .merge(reservation_routes())
        .merge(rewards_routes())
        .merge(maintenance_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Registration, login, current user
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Site catalog and plans
fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/sites", get(handlers::sites::list_sites))
        .route("/sites/seed", post(handlers::sites::seed_sites))
        .route("/sites/{slug}", get(handlers::sites::get_site))
        .route(
            "/sites/{slug}/reset-booths",
            post(handlers::sites::reset_booths),
        )
        .route("/plans", get(handlers::sites::list_plans))
}

/// Booth registry
fn booth_routes() -> Router<AppState> {
    Router::new()
        .route("/booths", get(handlers::booths::list_booths))
        .route("/booths/release", post(handlers::booths::release_booths))
        .route("/booths/{id}", get(handlers::booths::get_booth))
        .route("/booths/{id}/state", put(handlers::booths::set_booth_state))
}

/// Reservation ledger
fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            post(handlers::reservations::create_reservation)
                .get(handlers::reservations::list_reservations),
        )
        .route(
            "/reservations/{id}",
            get(handlers::reservations::get_reservation),
        )
        .route(
            "/reservations/{id}/extend",
            post(handlers::reservations::extend_reservation),
        )
        .route(
            "/reservations/{id}/cancel",
            post(handlers::reservations::cancel_reservation),
        )
        .route(
            "/reservations/{id}/check-in",
            post(handlers::reservations::check_in),
        )
        .route(
            "/reservations/{id}/expire",
            post(handlers::reservations::expire_reservation),
        )
}

/// Loyalty points
fn rewards_routes() -> Router<AppState> {
    Router::new()
        .route("/rewards/me", get(handlers::rewards::my_rewards))
        .route("/rewards/redeem", post(handlers::rewards::redeem))
}

/// Batch maintenance
fn maintenance_routes() -> Router<AppState> {
    Router::new().route("/maintenance/sweep", post(handlers::maintenance::sweep))
}

/// Health probe
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
