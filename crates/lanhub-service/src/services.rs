//! Wiring of every service over one set of stores.

use std::sync::Arc;

use lanhub_auth::{JwtEncoder, PasswordHasher, PasswordValidator};
use lanhub_core::config::AppConfig;
use lanhub_core::traits::Clock;
use lanhub_database::Stores;

use crate::account::AccountService;
use crate::booth::BoothService;
use crate::catalog::CatalogService;
use crate::reservation::ReservationService;
use crate::rewards::RewardsService;
use crate::sweeper::ExpirationSweeper;

/// All services, sharing stores, clock and sweeper.
#[derive(Debug, Clone)]
pub struct Services {
    /// Registration and login.
    pub accounts: Arc<AccountService>,
    /// Sites and plans.
    pub catalog: Arc<CatalogService>,
    /// Booth registry.
    pub booths: Arc<BoothService>,
    /// Reservation ledger.
    pub reservations: Arc<ReservationService>,
    /// Loyalty points.
    pub rewards: Arc<RewardsService>,
    /// Expiration sweeper.
    pub sweeper: Arc<ExpirationSweeper>,
}

impl Services {
    /// Build every service over `stores`.
    pub fn build(stores: &Stores, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let sweeper = Arc::new(ExpirationSweeper::new(
            stores.reservations.clone(),
            stores.booths.clone(),
            stores.users.clone(),
            clock.clone(),
        ));
        let catalog = Arc::new(CatalogService::new(
            stores.sites.clone(),
            stores.booths.clone(),
            sweeper.clone(),
            clock.clone(),
            config.reservation.clone(),
        ));
        let rewards = Arc::new(RewardsService::new(stores.users.clone()));
        let booths = Arc::new(BoothService::new(
            stores.booths.clone(),
            catalog.clone(),
            sweeper.clone(),
            clock.clone(),
        ));
        let reservations = Arc::new(ReservationService::new(
            stores.reservations.clone(),
            stores.booths.clone(),
            stores.users.clone(),
            catalog.clone(),
            rewards.clone(),
            sweeper.clone(),
            clock.clone(),
        ));
        let accounts = Arc::new(AccountService::new(
            stores.users.clone(),
            Arc::new(PasswordHasher::new()),
            Arc::new(PasswordValidator::new(&config.auth)),
            Arc::new(JwtEncoder::new(&config.auth)),
            clock,
        ));

        Self {
            accounts,
            catalog,
            booths,
            reservations,
            rewards,
            sweeper,
        }
    }
}
