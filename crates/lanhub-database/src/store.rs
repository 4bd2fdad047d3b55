//! Store traits and the store bundle handed to services.
//!
//! Every mutation that has to be race-free (claiming booths, moving a
//! reservation between states, debiting points) is a single conditional
//! operation on the store, so the services never hold locks across calls.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use lanhub_core::AppResult;
use lanhub_core::config::{DatabaseConfig, StoreProvider};
use lanhub_core::types::{BoothId, ReservationId, SiteId, UserId};
use lanhub_entity::booth::{Booth, BoothClaim, BoothState, BoothSummary};
use lanhub_entity::reservation::Reservation;
use lanhub_entity::site::Site;
use lanhub_entity::user::{RewardsAccount, User, UserActivity, UserRole};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::repositories::{
    BoothRepository, ReservationRepository, SiteRepository, UserRepository,
};

/// Result of claiming a set of booths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Every booth was free and is now held.
    Claimed,
    /// Nothing was claimed; these booths were not free.
    Conflict {
        /// Booths that were not free.
        unavailable: Vec<BoothId>,
    },
}

/// Site catalog persistence.
#[async_trait]
pub trait SiteStore: Send + Sync + Debug {
    /// Active sites ordered by name.
    async fn list_active(&self) -> AppResult<Vec<Site>>;

    /// Find a site by id.
    async fn find_by_id(&self, id: SiteId) -> AppResult<Option<Site>>;

    /// Find a site by slug.
    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Site>>;

    /// Insert a site. Duplicate slugs are a `Conflict`.
    async fn insert(&self, site: &Site) -> AppResult<()>;

    /// Number of sites.
    async fn count(&self) -> AppResult<i64>;
}

/// Booth registry persistence.
#[async_trait]
pub trait BoothStore: Send + Sync + Debug {
    /// Booths ordered by (site, number), optionally restricted to one site.
    async fn list(&self, site_id: Option<SiteId>) -> AppResult<Vec<Booth>>;

    /// Find a booth by id.
    async fn find_by_id(&self, id: BoothId) -> AppResult<Option<Booth>>;

    /// Booths of a site with the given numbers, ordered by number.
    async fn find_by_numbers(&self, site_id: SiteId, numbers: &[i32]) -> AppResult<Vec<Booth>>;

    /// Free and total booth counts of a site.
    async fn summary(&self, site_id: SiteId) -> AppResult<BoothSummary>;

    /// Insert new booths.
    async fn insert_many(&self, booths: &[Booth]) -> AppResult<()>;

    /// Delete every booth of a site, returning how many were removed.
    async fn delete_by_site(&self, site_id: SiteId) -> AppResult<u64>;

    /// Claim all of `booth_ids` for a reservation, or none of them.
    async fn claim(
        &self,
        booth_ids: &[BoothId],
        claim: &BoothClaim,
        now: DateTime<Utc>,
    ) -> AppResult<ClaimOutcome>;

    /// Free the held booths among `booth_ids`. Returns how many changed.
    async fn release(&self, booth_ids: &[BoothId], now: DateTime<Utc>) -> AppResult<u64>;

    /// Free the booths still held by `reservation_id`.
    async fn release_for_reservation(
        &self,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Free held booths whose session ended at or before `now`.
    async fn sweep_expired(&self, now: DateTime<Utc>, site_id: Option<SiteId>) -> AppResult<u64>;

    /// Move the session end of every booth held by `reservation_id`.
    async fn extend_session(
        &self,
        reservation_id: ReservationId,
        new_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Mark the reserved booths of `reservation_id` as occupied.
    async fn occupy(&self, reservation_id: ReservationId, now: DateTime<Utc>) -> AppResult<u64>;

    /// Set a manual state on a booth no reservation holds.
    ///
    /// Returns `false` when the booth is held or does not exist.
    async fn set_state(&self, id: BoothId, state: BoothState, now: DateTime<Utc>)
    -> AppResult<bool>;
}

/// Reservation ledger persistence.
#[async_trait]
pub trait ReservationStore: Send + Sync + Debug {
    /// Insert a new reservation. Duplicate codes are a `Conflict`.
    async fn insert(&self, reservation: &Reservation) -> AppResult<()>;

    /// Find a reservation by id.
    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>>;

    /// Find a reservation by its code.
    async fn find_by_code(&self, code: &str) -> AppResult<Option<Reservation>>;

    /// A user's reservations, newest first.
    async fn list_by_user(&self, user_id: UserId, limit: i64) -> AppResult<Vec<Reservation>>;

    /// Non-terminal reservations whose window ended at or before `now`.
    async fn list_due(&self, now: DateTime<Utc>) -> AppResult<Vec<Reservation>>;

    /// Persist `reservation` if the stored version is still `expected_version`.
    ///
    /// The stored version becomes `expected_version + 1`. Returns `false`
    /// when another writer got there first.
    async fn update(&self, reservation: &Reservation, expected_version: i32) -> AppResult<bool>;

    /// Delete a reservation. Only used to undo a failed booking.
    async fn delete(&self, id: ReservationId) -> AppResult<bool>;
}

/// User and rewards persistence.
#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Find a user by id.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by email, case-insensitively.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find a user by username, case-insensitively.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a user. Duplicate username or email is a `Conflict`.
    async fn create(&self, user: &User) -> AppResult<()>;

    /// Add earned points. `NotFound` when the user does not exist.
    async fn credit(&self, id: UserId, amount: i64) -> AppResult<RewardsAccount>;

    /// Spend points. Returns `None` when the balance is too low.
    async fn debit(&self, id: UserId, amount: i64) -> AppResult<Option<RewardsAccount>>;

    /// Fold a reservation event into the user's statistics.
    async fn record_activity(&self, id: UserId, activity: UserActivity) -> AppResult<()>;

    /// Record a successful login.
    async fn touch_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()>;

    /// Change a user's role.
    async fn set_role(&self, id: UserId, role: UserRole) -> AppResult<bool>;
}

/// The four stores, backed by one provider.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Site catalog.
    pub sites: Arc<dyn SiteStore>,
    /// Booth registry.
    pub booths: Arc<dyn BoothStore>,
    /// Reservation ledger.
    pub reservations: Arc<dyn ReservationStore>,
    /// Users and rewards.
    pub users: Arc<dyn UserStore>,
    pool: Option<DatabasePool>,
}

impl Stores {
    /// Stores sharing one in-memory state.
    pub fn memory() -> Self {
        Self::from_memory(MemoryStore::new())
    }

    /// Stores backed by an existing [`MemoryStore`].
    pub fn from_memory(store: MemoryStore) -> Self {
        Self {
            sites: Arc::new(store.clone()),
            booths: Arc::new(store.clone()),
            reservations: Arc::new(store.clone()),
            users: Arc::new(store),
            pool: None,
        }
    }

    /// Stores backed by PostgreSQL.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            sites: Arc::new(SiteRepository::new(pg.clone())),
            booths: Arc::new(BoothRepository::new(pg.clone())),
            reservations: Arc::new(ReservationRepository::new(pg.clone())),
            users: Arc::new(UserRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Build the stores selected by configuration, migrating if asked to.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            StoreProvider::Memory => {
                info!("Using in-memory store");
                Ok(Self::memory())
            }
            StoreProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    pool.migrate().await?;
                }
                Ok(Self::postgres(pool))
            }
        }
    }

    /// The PostgreSQL pool, when the stores are backed by one.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Check that the backing store is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.ping().await.map(|()| true),
            None => Ok(true),
        }
    }
}
