//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use lanhub_auth::JwtDecoder;
use lanhub_core::config::AppConfig;
use lanhub_database::Stores;
use lanhub_service::{
    AccountService, BoothService, CatalogService, ExpirationSweeper, ReservationService,
    RewardsService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Stores (PostgreSQL or in-memory)
    pub stores: Stores,
    /// When the server started
    pub started_at: Instant,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token decoder
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Registration and login
    pub accounts: Arc<AccountService>,
    /// Sites and plans
    pub catalog: Arc<CatalogService>,
    /// Booth registry
    pub booths: Arc<BoothService>,
    /// Reservation ledger
    pub reservations: Arc<ReservationService>,
    /// Loyalty points
    pub rewards: Arc<RewardsService>,
    /// Expiration sweeper
    pub sweeper: Arc<ExpirationSweeper>,
}
