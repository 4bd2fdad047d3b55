//! Expiration sweeper.
//!
//! There is no background timer. Listing reads and the maintenance
//! endpoint call [`ExpirationSweeper::sweep`], which closes due
//! reservations and frees booths whose session has ended.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use lanhub_core::{AppError, AppResult};
use lanhub_core::traits::Clock;
use lanhub_core::types::{ReservationId, SiteId};
use lanhub_database::store::{BoothStore, ReservationStore, UserStore};
use lanhub_entity::reservation::{Reservation, ReservationState};
use lanhub_entity::user::UserActivity;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Booths returned to `Free`.
    pub booths_released: u64,
    /// Reservations moved to a terminal state.
    pub reservations_closed: u64,
}

/// Result of closing one reservation.
#[derive(Debug, Clone)]
pub struct ClosedReservation {
    /// The reservation as stored after closing.
    pub reservation: Reservation,
    /// Booths freed.
    pub booths_released: u64,
}

/// Closes elapsed reservations and frees their booths.
#[derive(Debug, Clone)]
pub struct ExpirationSweeper {
    reservations: Arc<dyn ReservationStore>,
    booths: Arc<dyn BoothStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl ExpirationSweeper {
    /// Creates a new sweeper.
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        booths: Arc<dyn BoothStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reservations,
            booths,
            users,
            clock,
        }
    }

    /// Close every due reservation, then free expired booths.
    ///
    /// `site_id` limits the booth pass; due reservations are always closed
    /// everywhere. Running it twice in a row is a no-op the second time.
    pub async fn sweep(&self, site_id: Option<SiteId>) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for reservation in self.reservations.list_due(now).await? {
            if let Some(closed) = self.close(reservation, now).await? {
                report.reservations_closed += 1;
                report.booths_released += closed.booths_released;
            }
        }

        report.booths_released += self.booths.sweep_expired(now, site_id).await?;

        if report != SweepReport::default() {
            info!(
                booths_released = report.booths_released,
                reservations_closed = report.reservations_closed,
                "Expired sessions swept"
            );
        }
        Ok(report)
    }

    /// Move a non-terminal reservation to its terminal state and free its booths.
    ///
    /// Active sessions finish as `Completed`, anything earlier as `Expired`.
    /// Returns `None` if another writer changed the reservation first.
    pub async fn close(
        &self,
        reservation: Reservation,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ClosedReservation>> {
        self.finish(reservation, "Time window elapsed", now).await
    }

    /// Close the reservation holding a booth, before its window ends.
    ///
    /// Returns `None` if the reservation is gone or already terminal.
    /// A concurrent change to the reservation is a `Conflict`.
    pub async fn end_holder(
        &self,
        id: ReservationId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ClosedReservation>> {
        let Some(reservation) = self.reservations.find_by_id(id).await? else {
            return Ok(None);
        };
        if reservation.state.is_terminal() {
            return Ok(None);
        }
        let code = reservation.code.clone();
        match self.finish(reservation, reason, now).await? {
            Some(closed) => Ok(Some(closed)),
            None => Err(AppError::conflict(format!(
                "Reservation {code} was changed by another request; retry the release"
            ))),
        }
    }

    async fn finish(
        &self,
        mut reservation: Reservation,
        reason: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ClosedReservation>> {
        let expected = reservation.version;
        let target = reservation.finish(reason, now)?;
        if !self.reservations.update(&reservation, expected).await? {
            debug!(reservation_id = %reservation.id, "Reservation changed concurrently, skipping");
            return Ok(None);
        }
        reservation.version = expected + 1;

        let booths_released = self
            .booths
            .release_for_reservation(reservation.id, now)
            .await?;

        if target == ReservationState::Completed {
            let activity = UserActivity::Completed {
                hours: reservation.total_minutes() as f64 / 60.0,
                spent: reservation.total_spent(),
            };
            if let Err(e) = self
                .users
                .record_activity(reservation.user_id, activity)
                .await
            {
                warn!(
                    reservation_id = %reservation.id,
                    error = %e,
                    "Failed to record completed reservation in user statistics"
                );
            }
        }

        debug!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            state = %target,
            booths_released,
            "Reservation closed"
        );
        Ok(Some(ClosedReservation {
            reservation,
            booths_released,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use lanhub_entity::plan::PaymentMethod;

    use super::*;
    use crate::reservation::CreateReservation;
    use crate::testing::Harness;

    async fn book(h: &Harness, numbers: &[i32], plan: &str) -> Reservation {
        let ctx = h.customer(&format!("user{}", numbers[0])).await;
        h.reservations
            .create(
                &ctx,
                CreateReservation {
                    user_id: None,
                    site_id: None,
                    booth_numbers: numbers.to_vec(),
                    plan_id: plan.to_string(),
                    payment_method: PaymentMethod::Yape,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sweep_closes_only_due_reservations() {
        let h = Harness::seeded().await;
        let short = book(&h, &[1], "S/1").await;
        let long = book(&h, &[2, 3], "S/5").await;

        h.clock.advance(Duration::minutes(30));
        assert_eq!(h.sweeper.sweep(None).await.unwrap(), SweepReport::default());

        h.clock.advance(Duration::seconds(1));
        let report = h.sweeper.sweep(None).await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                booths_released: 1,
                reservations_closed: 1
            }
        );

        let short = h.stores.reservations.find_by_id(short.id).await.unwrap().unwrap();
        assert_eq!(short.state, ReservationState::Completed);
        let long = h.stores.reservations.find_by_id(long.id).await.unwrap().unwrap();
        assert_eq!(long.state, ReservationState::Active);

        assert_eq!(h.sweeper.sweep(None).await.unwrap(), SweepReport::default());
    }

    #[tokio::test]
    async fn test_close_with_stale_copy_does_nothing() {
        let h = Harness::seeded().await;
        let booked = book(&h, &[5], "S/1").await;
        let stale = h.stores.reservations.find_by_id(booked.id).await.unwrap().unwrap();

        h.clock.advance(Duration::minutes(31));
        let now = h.clock.now();
        let first = h.sweeper.close(stale.clone(), now).await.unwrap();
        assert!(first.is_some());
        let second = h.sweeper.close(stale, now).await.unwrap();
        assert!(second.is_none());

        let user = h.user(booked.user_id).await;
        assert_eq!(user.stats.completed_reservations, 1);
        assert!((user.stats.total_hours - 0.5).abs() < f64::EPSILON);
    }
}
