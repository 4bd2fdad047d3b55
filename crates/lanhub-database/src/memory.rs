//! In-memory store using a Tokio mutex for single-node deployments and tests.
//!
//! All four store traits share one state behind one lock, so every
//! operation below is atomic with respect to every other.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use lanhub_core::types::{BoothId, ReservationId, SiteId, UserId};
use lanhub_core::{AppError, AppResult};
use lanhub_entity::booth::{Booth, BoothClaim, BoothState, BoothSummary};
use lanhub_entity::reservation::Reservation;
use lanhub_entity::site::Site;
use lanhub_entity::user::{RewardsAccount, User, UserActivity, UserRole};

use crate::store::{BoothStore, ClaimOutcome, ReservationStore, SiteStore, UserStore};

#[derive(Debug, Default)]
struct InnerState {
    sites: HashMap<SiteId, Site>,
    booths: HashMap<BoothId, Booth>,
    reservations: HashMap<ReservationId, Reservation>,
    users: HashMap<UserId, User>,
}

impl InnerState {
    fn release_where(&mut self, now: DateTime<Utc>, pred: impl Fn(&Booth) -> bool) -> u64 {
        let mut released = 0;
        for booth in self.booths.values_mut().filter(|b| pred(b)) {
            if booth.release(now) {
                released += 1;
            }
        }
        released
    }

    fn user_mut(&mut self, id: UserId) -> AppResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }
}

/// Process-local store implementing every store trait.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_booths<'a>(booths: impl Iterator<Item = &'a Booth>) -> Vec<Booth> {
    let mut out: Vec<Booth> = booths.cloned().collect();
    out.sort_by(|a, b| (a.site_id.0, a.number).cmp(&(b.site_id.0, b.number)));
    out
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn list_active(&self) -> AppResult<Vec<Site>> {
        let state = self.state.lock().await;
        let mut sites: Vec<Site> = state.sites.values().filter(|s| s.active).cloned().collect();
        sites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sites)
    }

    async fn find_by_id(&self, id: SiteId) -> AppResult<Option<Site>> {
        Ok(self.state.lock().await.sites.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Site>> {
        let state = self.state.lock().await;
        Ok(state.sites.values().find(|s| s.slug == slug).cloned())
    }

    async fn insert(&self, site: &Site) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.sites.values().any(|s| s.slug == site.slug) {
            return Err(AppError::conflict(format!(
                "Site '{}' already exists",
                site.slug
            )));
        }
        state.sites.insert(site.id, site.clone());
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.sites.len() as i64)
    }
}

#[async_trait]
impl BoothStore for MemoryStore {
    async fn list(&self, site_id: Option<SiteId>) -> AppResult<Vec<Booth>> {
        let state = self.state.lock().await;
        Ok(sorted_booths(
            state
                .booths
                .values()
                .filter(|b| site_id.is_none_or(|id| b.site_id == id)),
        ))
    }

    async fn find_by_id(&self, id: BoothId) -> AppResult<Option<Booth>> {
        Ok(self.state.lock().await.booths.get(&id).cloned())
    }

    async fn find_by_numbers(&self, site_id: SiteId, numbers: &[i32]) -> AppResult<Vec<Booth>> {
        let state = self.state.lock().await;
        Ok(sorted_booths(
            state
                .booths
                .values()
                .filter(|b| b.site_id == site_id && numbers.contains(&b.number)),
        ))
    }

    async fn summary(&self, site_id: SiteId) -> AppResult<BoothSummary> {
        let state = self.state.lock().await;
        let mut summary = BoothSummary::default();
        for booth in state.booths.values().filter(|b| b.site_id == site_id) {
            summary.total += 1;
            if booth.is_free() {
                summary.free += 1;
            }
        }
        Ok(summary)
    }

    async fn insert_many(&self, booths: &[Booth]) -> AppResult<()> {
        let mut state = self.state.lock().await;
        for booth in booths {
            let duplicate = state
                .booths
                .values()
                .any(|b| b.site_id == booth.site_id && b.number == booth.number);
            if duplicate {
                return Err(AppError::conflict(format!(
                    "Booth {} already exists at site {}",
                    booth.number, booth.site_id
                )));
            }
        }
        for booth in booths {
            state.booths.insert(booth.id, booth.clone());
        }
        Ok(())
    }

    async fn delete_by_site(&self, site_id: SiteId) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.booths.len();
        state.booths.retain(|_, b| b.site_id != site_id);
        Ok((before - state.booths.len()) as u64)
    }

    async fn claim(
        &self,
        booth_ids: &[BoothId],
        claim: &BoothClaim,
        now: DateTime<Utc>,
    ) -> AppResult<ClaimOutcome> {
        let mut state = self.state.lock().await;
        let unavailable: Vec<BoothId> = booth_ids
            .iter()
            .filter(|id| !state.booths.get(*id).is_some_and(Booth::is_free))
            .copied()
            .collect();
        if !unavailable.is_empty() {
            return Ok(ClaimOutcome::Conflict { unavailable });
        }
        for id in booth_ids {
            if let Some(booth) = state.booths.get_mut(id) {
                booth.claim(claim, now);
            }
        }
        debug!(
            reservation_id = %claim.reservation_id,
            booths = booth_ids.len(),
            "Booths claimed"
        );
        Ok(ClaimOutcome::Claimed)
    }

    async fn release(&self, booth_ids: &[BoothId], now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.release_where(now, |b| booth_ids.contains(&b.id)))
    }

    async fn release_for_reservation(
        &self,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.release_where(now, |b| {
            b.active_reservation_id == Some(reservation_id)
        }))
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, site_id: Option<SiteId>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        Ok(state.release_where(now, |b| {
            b.is_expired(now) && site_id.is_none_or(|id| b.site_id == id)
        }))
    }

    async fn extend_session(
        &self,
        reservation_id: ReservationId,
        new_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut moved = 0;
        for booth in state
            .booths
            .values_mut()
            .filter(|b| b.active_reservation_id == Some(reservation_id))
        {
            booth.session_end = Some(new_end);
            booth.updated_at = now;
            moved += 1;
        }
        Ok(moved)
    }

    async fn occupy(&self, reservation_id: ReservationId, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut occupied = 0;
        for booth in state
            .booths
            .values_mut()
            .filter(|b| b.active_reservation_id == Some(reservation_id))
        {
            if booth.state == BoothState::Reserved && booth.occupy(now) {
                occupied += 1;
            }
        }
        Ok(occupied)
    }

    async fn set_state(
        &self,
        id: BoothId,
        booth_state: BoothState,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state
            .booths
            .get_mut(&id)
            .is_some_and(|b| b.set_manual_state(booth_state, now)))
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn insert(&self, reservation: &Reservation) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state
            .reservations
            .values()
            .any(|r| r.code == reservation.code)
        {
            return Err(AppError::conflict(format!(
                "Reservation code '{}' already exists",
                reservation.code
            )));
        }
        state
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.state.lock().await.reservations.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Reservation>> {
        let state = self.state.lock().await;
        Ok(state
            .reservations
            .values()
            .find(|r| r.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn list_by_user(&self, user_id: UserId, limit: i64) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let mut out: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.0.cmp(&a.id.0)));
        out.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(out)
    }

    async fn list_due(&self, now: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let state = self.state.lock().await;
        let mut out: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.schedule.end);
        Ok(out)
    }

    async fn update(&self, reservation: &Reservation, expected_version: i32) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.reservations.get_mut(&reservation.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = reservation.clone();
                stored.version = expected_version + 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: ReservationId) -> AppResult<bool> {
        Ok(self.state.lock().await.reservations.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let taken = state.users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&user.username)
                || u.email.eq_ignore_ascii_case(&user.email)
        });
        if taken {
            return Err(AppError::conflict("Username or email already registered"));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn credit(&self, id: UserId, amount: i64) -> AppResult<RewardsAccount> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        user.rewards.credit(amount)?;
        Ok(user.rewards)
    }

    async fn debit(&self, id: UserId, amount: i64) -> AppResult<Option<RewardsAccount>> {
        let mut state = self.state.lock().await;
        let user = state.user_mut(id)?;
        if amount > user.rewards.points_current {
            return Ok(None);
        }
        user.rewards.debit(amount)?;
        Ok(Some(user.rewards))
    }

    async fn record_activity(&self, id: UserId, activity: UserActivity) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.user_mut(id)?.stats.apply(activity);
        Ok(())
    }

    async fn touch_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.user_mut(id)?.last_login_at = Some(at);
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: UserRole) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn store_with_booths(count: i32) -> (MemoryStore, SiteId, Vec<Booth>) {
        let store = MemoryStore::new();
        let site_id = SiteId::new();
        let now = Utc::now();
        let booths: Vec<Booth> = (1..=count).map(|n| Booth::new(site_id, n, now)).collect();
        store.insert_many(&booths).await.expect("insert booths");
        (store, site_id, booths)
    }

    fn claim(now: DateTime<Utc>) -> BoothClaim {
        BoothClaim {
            reservation_id: ReservationId::new(),
            user_id: UserId::new(),
            start: now,
            end: now + Duration::minutes(30),
        }
    }

    #[tokio::test]
    async fn test_claim_is_all_or_nothing() {
        let (store, site_id, booths) = store_with_booths(4).await;
        let now = Utc::now();

        let first = store
            .claim(&[booths[2].id], &claim(now), now)
            .await
            .expect("claim");
        assert_eq!(first, ClaimOutcome::Claimed);

        let second = store
            .claim(&[booths[1].id, booths[2].id], &claim(now), now)
            .await
            .expect("claim");
        assert_eq!(
            second,
            ClaimOutcome::Conflict {
                unavailable: vec![booths[2].id]
            }
        );

        let summary = store.summary(site_id).await.expect("summary");
        assert_eq!(summary.free, 3);
        assert_eq!(summary.total, 4);
    }

    #[tokio::test]
    async fn test_sweep_releases_only_expired() {
        let (store, site_id, booths) = store_with_booths(2).await;
        let now = Utc::now();
        store
            .claim(&[booths[0].id], &claim(now), now)
            .await
            .expect("claim");
        let mut long = claim(now);
        long.end = now + Duration::hours(3);
        store
            .claim(&[booths[1].id], &long, now)
            .await
            .expect("claim");

        let at_end = now + Duration::minutes(30);
        assert_eq!(store.sweep_expired(at_end, None).await.expect("sweep"), 0);

        let later = now + Duration::minutes(31);
        assert_eq!(store.sweep_expired(later, Some(site_id)).await.expect("sweep"), 1);
        assert_eq!(store.sweep_expired(later, None).await.expect("sweep"), 0);

        let listed = store.list(Some(site_id)).await.expect("list");
        assert_eq!(listed[0].state, BoothState::Free);
        assert_eq!(listed[1].state, BoothState::Reserved);
        assert!(listed.iter().all(Booth::is_consistent));
    }

    #[tokio::test]
    async fn test_debit_refuses_overdraft() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let user = lanhub_entity::user::CreateUser {
            username: "u1".to_string(),
            email: "u1@example.com".to_string(),
            password_hash: "x".to_string(),
            first_name: "U".to_string(),
            last_name: "One".to_string(),
            role: UserRole::Customer,
        }
        .into_user(now);
        store.create(&user).await.expect("create");
        store.credit(user.id, 5).await.expect("credit");

        assert!(store.debit(user.id, 6).await.expect("debit").is_none());
        let account = store
            .debit(user.id, 5)
            .await
            .expect("debit")
            .expect("enough points");
        assert_eq!(account.points_current, 0);
        assert_eq!(account.points_redeemed, 5);
    }

    #[tokio::test]
    async fn test_versioned_update() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let plan = lanhub_entity::plan::plan_for("S/1").expect("plan");
        let reservation = Reservation::book(
            lanhub_entity::reservation::NewReservation {
                id: ReservationId::new(),
                code: "SL000000AAAA".to_string(),
                user_id: UserId::new(),
                site: lanhub_entity::reservation::SiteSnapshot {
                    id: SiteId::new(),
                    slug: "s".to_string(),
                    name: "S".to_string(),
                },
                booths: vec![lanhub_entity::reservation::BoothRef {
                    number: 1,
                    booth_id: BoothId::new(),
                }],
                plan,
                payment_method: Default::default(),
            },
            now,
        )
        .expect("book");
        ReservationStore::insert(&store, &reservation)
            .await
            .expect("insert");

        assert!(store.update(&reservation, 0).await.expect("update"));
        assert!(!store.update(&reservation, 0).await.expect("stale update"));
        let stored = ReservationStore::find_by_id(&store, reservation.id)
            .await
            .expect("find")
            .expect("exists");
        assert_eq!(stored.version, 1);
    }
}
