//! Shared fixture for service tests.

use std::sync::Arc;

use chrono::Utc;

use lanhub_core::config::AppConfig;
use lanhub_core::traits::{Clock, ManualClock};
use lanhub_core::types::UserId;
use lanhub_database::Stores;
use lanhub_entity::user::{CreateUser, User, UserRole};

use crate::account::AccountService;
use crate::booth::BoothService;
use crate::catalog::CatalogService;
use crate::context::RequestContext;
use crate::reservation::ReservationService;
use crate::rewards::RewardsService;
use crate::services::Services;
use crate::sweeper::ExpirationSweeper;

/// Services over a seeded in-memory store and a manual clock.
pub(crate) struct Harness {
    pub stores: Stores,
    pub clock: ManualClock,
    pub accounts: Arc<AccountService>,
    pub catalog: Arc<CatalogService>,
    pub booths: Arc<BoothService>,
    pub reservations: Arc<ReservationService>,
    pub rewards: Arc<RewardsService>,
    pub sweeper: Arc<ExpirationSweeper>,
}

impl Harness {
    pub async fn seeded() -> Self {
        let stores = Stores::memory();
        let clock = ManualClock::new(Utc::now());
        let services = Services::build(&stores, &AppConfig::default(), Arc::new(clock.clone()));
        services
            .catalog
            .seed_catalog(&RequestContext::system())
            .await
            .unwrap();
        Self {
            stores,
            clock,
            accounts: services.accounts,
            catalog: services.catalog,
            booths: services.booths,
            reservations: services.reservations,
            rewards: services.rewards,
            sweeper: services.sweeper,
        }
    }

    /// Create a customer directly in the store and return their context.
    pub async fn customer(&self, username: &str) -> RequestContext {
        let user = CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "unused".to_string(),
            first_name: username.to_string(),
            last_name: "Test".to_string(),
            role: UserRole::Customer,
        }
        .into_user(self.clock.now());
        self.stores.users.create(&user).await.unwrap();
        RequestContext::new(user.id, user.role, user.username)
    }

    pub async fn user(&self, id: UserId) -> User {
        self.stores.users.find_by_id(id).await.unwrap().unwrap()
    }
}
