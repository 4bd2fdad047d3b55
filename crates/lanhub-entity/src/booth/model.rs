//! Booth entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lanhub_core::types::{BoothId, ReservationId, SiteId, UserId};

use super::state::BoothState;

/// A bookable booth at a site.
///
/// `active_reservation_id`, `current_user_id`, `session_start` and
/// `session_end` are set exactly when [`BoothState::is_held`] holds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booth {
    /// Unique booth identifier.
    pub id: BoothId,
    /// Owning site.
    pub site_id: SiteId,
    /// Index unique within the site, starting at 1.
    pub number: i32,
    /// Current occupancy state.
    pub state: BoothState,
    /// Reservation currently holding the booth.
    pub active_reservation_id: Option<ReservationId>,
    /// User currently holding the booth.
    pub current_user_id: Option<UserId>,
    /// Start of the current session.
    pub session_start: Option<DateTime<Utc>>,
    /// End of the current session.
    pub session_end: Option<DateTime<Utc>>,
    /// How many reservations have claimed this booth.
    pub total_reservations: i32,
    /// Cumulative held hours.
    pub usage_hours: f64,
    /// When the booth was last released.
    pub last_used_at: Option<DateTime<Utc>>,
    /// When the booth was created.
    pub created_at: DateTime<Utc>,
    /// When the booth was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Parameters of a claim on a set of booths.
#[derive(Debug, Clone, Copy)]
pub struct BoothClaim {
    /// The claiming reservation.
    pub reservation_id: ReservationId,
    /// The claiming user.
    pub user_id: UserId,
    /// Session start.
    pub start: DateTime<Utc>,
    /// Session end.
    pub end: DateTime<Utc>,
}

impl Booth {
    /// Create a free booth.
    pub fn new(site_id: SiteId, number: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: BoothId::new(),
            site_id,
            number,
            state: BoothState::Free,
            active_reservation_id: None,
            current_user_id: None,
            session_start: None,
            session_end: None,
            total_reservations: 0,
            usage_hours: 0.0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the booth can be claimed.
    pub fn is_free(&self) -> bool {
        self.state == BoothState::Free
    }

    /// Whether the held session has ended at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.state.is_held() && self.session_end.is_some_and(|end| end < now)
    }

    /// Whole minutes left in the current session, never negative.
    pub fn time_remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        match self.session_end {
            Some(end) if end > now => (end - now).num_minutes(),
            _ => 0,
        }
    }

    /// Hold the booth for a reservation. Returns `false` if not free.
    pub fn claim(&mut self, claim: &BoothClaim, now: DateTime<Utc>) -> bool {
        if !self.is_free() {
            return false;
        }
        self.state = BoothState::Reserved;
        self.active_reservation_id = Some(claim.reservation_id);
        self.current_user_id = Some(claim.user_id);
        self.session_start = Some(claim.start);
        self.session_end = Some(claim.end);
        self.total_reservations += 1;
        self.updated_at = now;
        true
    }

    /// Return a held booth to `Free`, folding the held time into usage.
    ///
    /// Returns `false` (and changes nothing) when the booth is not held.
    pub fn release(&mut self, now: DateTime<Utc>) -> bool {
        if !self.state.is_held() {
            return false;
        }
        if let Some(start) = self.session_start {
            let end = self.session_end.map_or(now, |end| end.min(now));
            if end > start {
                self.usage_hours += held_hours(end - start);
            }
        }
        self.state = BoothState::Free;
        self.active_reservation_id = None;
        self.current_user_id = None;
        self.session_start = None;
        self.session_end = None;
        self.last_used_at = Some(now);
        self.updated_at = now;
        true
    }

    /// Mark a reserved booth as occupied. Idempotent for occupied booths.
    pub fn occupy(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            BoothState::Reserved => {
                self.state = BoothState::Occupied;
                self.updated_at = now;
                true
            }
            BoothState::Occupied => true,
            _ => false,
        }
    }

    /// Set a manual state on a booth that no reservation holds.
    pub fn set_manual_state(&mut self, state: BoothState, now: DateTime<Utc>) -> bool {
        if self.state.is_held() || !state.is_manual() {
            return false;
        }
        self.state = state;
        self.updated_at = now;
        true
    }

    /// Whether the reservation references agree with the state.
    pub fn is_consistent(&self) -> bool {
        let referenced = self.active_reservation_id.is_some();
        if self.state.is_held() {
            referenced
                && self.current_user_id.is_some()
                && self.session_start.is_some()
                && self.session_end.is_some()
        } else {
            !referenced
                && self.current_user_id.is_none()
                && self.session_start.is_none()
                && self.session_end.is_none()
        }
    }
}

fn held_hours(held: Duration) -> f64 {
    held.num_seconds() as f64 / 3600.0
}

/// Free/total booth counts of a site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothSummary {
    /// Booths currently free.
    pub free: i64,
    /// All booths of the site.
    pub total: i64,
}
