//! Reservation entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use lanhub_core::types::{BoothId, ReservationId, SiteId, UserId};
use lanhub_core::{AppError, AppResult};

use super::state::ReservationState;
use crate::plan::{CURRENCY, PaymentMethod, Plan};

/// A booking of one or more booths at a site for a fixed window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: ReservationId,
    /// Code shown to the customer.
    pub code: String,
    /// Booking user.
    pub user_id: UserId,
    /// Site at booking time.
    pub site: SiteSnapshot,
    /// Booked booths, in request order.
    pub booths: Vec<BoothRef>,
    /// Number of booked booths.
    pub booth_count: i32,
    /// Plan label of the initial booking.
    pub plan_id: String,
    /// Price breakdown.
    pub price: Price,
    /// Length of the initial booking.
    pub duration: DurationInfo,
    /// Time window and check-in markers.
    pub schedule: Schedule,
    /// Point yield.
    pub points: Points,
    /// Complimentary item of the plan.
    pub bonus: String,
    /// Payment record.
    pub payment: Payment,
    /// Current lifecycle state.
    pub state: ReservationState,
    /// Append-only transition log.
    pub history: Vec<StateChange>,
    /// Time extensions, oldest first.
    pub extensions: Vec<Extension>,
    /// Optimistic concurrency counter, bumped on every stored update.
    #[serde(default, skip_serializing)]
    pub version: i32,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
    /// When the reservation was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Identity of the site a reservation was made at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSnapshot {
    /// Site identifier.
    pub id: SiteId,
    /// Site slug.
    pub slug: String,
    /// Site display name.
    pub name: String,
}

/// A booked booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothRef {
    /// Booth number within the site.
    pub number: i32,
    /// Booth identifier.
    pub booth_id: BoothId,
}

/// Price of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Price per booth.
    pub unit: i64,
    /// `unit * booth_count`.
    pub total: i64,
    /// ISO currency code.
    pub currency: String,
}

/// Length of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationInfo {
    /// Minutes.
    pub minutes: i64,
    /// Display text, e.g. `3 horas`.
    pub text: String,
}

/// Time window of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// When the booking was made.
    pub booked_at: DateTime<Utc>,
    /// Session start.
    pub start: DateTime<Utc>,
    /// Session end, moved forward by extensions.
    pub end: DateTime<Utc>,
    /// When the customer checked in.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// When the reservation reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
}

/// Point yield of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Points {
    /// Plan base points.
    pub base: i64,
    /// `base * booth_count`.
    pub per_booth: i64,
    /// Promotional extra points.
    pub bonus: i64,
    /// Everything credited for this reservation, extensions included.
    pub total: i64,
    /// Whether the points reached the user's account.
    pub awarded: bool,
}

/// Payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Method used.
    pub method: PaymentMethod,
    /// Whether payment was confirmed.
    pub confirmed: bool,
    /// When it was paid.
    pub paid_at: Option<DateTime<Utc>>,
}

/// One entry of the state history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    /// State entered.
    pub state: ReservationState,
    /// When it was entered.
    pub at: DateTime<Utc>,
    /// Why.
    pub reason: String,
}

/// A time extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Plan label used to extend.
    pub plan_id: String,
    /// Minutes added.
    pub minutes: i64,
    /// Plan price charged once for the extension, whatever the booth count.
    pub extra_price: i64,
    /// Points credited for the extension.
    pub extra_points: i64,
    /// When it was applied.
    pub at: DateTime<Utc>,
}

/// Inputs for booking a reservation.
#[derive(Debug, Clone)]
pub struct NewReservation {
    /// Pre-allocated id, so booths can be claimed for it.
    pub id: ReservationId,
    /// Customer-facing code.
    pub code: String,
    /// Booking user.
    pub user_id: UserId,
    /// Site snapshot.
    pub site: SiteSnapshot,
    /// Booths being booked.
    pub booths: Vec<BoothRef>,
    /// Chosen plan.
    pub plan: &'static Plan,
    /// Payment method.
    pub payment_method: PaymentMethod,
}

impl Reservation {
    /// Book a paid reservation starting at `now`.
    pub fn book(new: NewReservation, now: DateTime<Utc>) -> AppResult<Self> {
        if new.booths.is_empty() {
            return Err(AppError::validation("At least one booth is required"));
        }
        let count = new.booths.len() as i64;
        let plan = new.plan;
        let per_booth = plan.points_for(count);
        Ok(Self {
            id: new.id,
            code: new.code,
            user_id: new.user_id,
            site: new.site,
            booth_count: count as i32,
            booths: new.booths,
            plan_id: plan.id.to_string(),
            price: Price {
                unit: plan.unit_price(),
                total: plan.total_price(count),
                currency: CURRENCY.to_string(),
            },
            duration: DurationInfo {
                minutes: plan.duration_minutes,
                text: plan.duration_text(),
            },
            schedule: Schedule {
                booked_at: now,
                start: now,
                end: now + Duration::minutes(plan.duration_minutes),
                checked_in_at: None,
                finished_at: None,
            },
            points: Points {
                base: plan.base_points,
                per_booth,
                bonus: 0,
                total: per_booth,
                awarded: true,
            },
            bonus: plan.bonus.to_string(),
            payment: Payment {
                method: new.payment_method,
                confirmed: true,
                paid_at: Some(now),
            },
            state: ReservationState::Active,
            history: vec![StateChange {
                state: ReservationState::Active,
                at: now,
                reason: "Reservation created".to_string(),
            }],
            extensions: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Ids of the booked booths.
    pub fn booth_ids(&self) -> Vec<BoothId> {
        self.booths.iter().map(|b| b.booth_id).collect()
    }

    /// Numbers of the booked booths.
    pub fn booth_numbers(&self) -> Vec<i32> {
        self.booths.iter().map(|b| b.number).collect()
    }

    /// Whether the window has elapsed on a non-terminal reservation.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.state.is_terminal() && self.schedule.end < now
    }

    /// Whole minutes left in the window, never negative.
    pub fn time_remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        if self.state.is_terminal() || self.schedule.end < now {
            return 0;
        }
        (self.schedule.end - now).num_minutes()
    }

    /// Minutes booked including extensions.
    pub fn total_minutes(&self) -> i64 {
        self.duration.minutes + self.extensions.iter().map(|e| e.minutes).sum::<i64>()
    }

    /// Money charged including extensions.
    pub fn total_spent(&self) -> i64 {
        self.price.total + self.extensions.iter().map(|e| e.extra_price).sum::<i64>()
    }

    /// Move to `next`, recording the change.
    pub fn transition(
        &mut self,
        next: ReservationState,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Reservation {} cannot move from {} to {}",
                self.code, self.state, next
            )));
        }
        self.state = next;
        self.history.push(StateChange {
            state: next,
            at: now,
            reason: reason.into(),
        });
        if next.is_terminal() {
            self.schedule.finished_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Close a reservation whose window has elapsed.
    pub fn lapse(&mut self, now: DateTime<Utc>) -> AppResult<ReservationState> {
        self.finish("Time window elapsed", now)
    }

    /// Close the reservation early. Active sessions finish as `Completed`,
    /// earlier states as `Expired`.
    pub fn finish(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AppResult<ReservationState> {
        let target = self.state.lapse_target();
        self.transition(target, reason, now)?;
        Ok(target)
    }

    /// Add `plan`'s time to an active reservation.
    ///
    /// Records `Extended` then `Active` in the history, pushes the window end
    /// forward and adds the plan's points for every booth.
    pub fn extend(&mut self, plan: &Plan, now: DateTime<Utc>) -> AppResult<Extension> {
        if self.state != ReservationState::Active {
            return Err(AppError::conflict(format!(
                "Only active reservations can be extended; {} is {}",
                self.code, self.state
            )));
        }
        let count = i64::from(self.booth_count);
        let extension = Extension {
            plan_id: plan.id.to_string(),
            minutes: plan.duration_minutes,
            extra_price: plan.unit_price(),
            extra_points: plan.points_for(count),
            at: now,
        };
        self.transition(
            ReservationState::Extended,
            format!("Extended by {} minutes", plan.duration_minutes),
            now,
        )?;
        self.transition(ReservationState::Active, "Extension applied", now)?;
        self.schedule.end += Duration::minutes(plan.duration_minutes);
        self.points.total += extension.extra_points;
        self.extensions.push(extension.clone());
        Ok(extension)
    }

    /// Record a check-in. Idempotent.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.state != ReservationState::Active || self.schedule.end < now {
            return Err(AppError::conflict(format!(
                "Reservation {} is not within an active window",
                self.code
            )));
        }
        if self.schedule.checked_in_at.is_none() {
            self.schedule.checked_in_at = Some(now);
            self.updated_at = now;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan_for;

    fn booked(plan_id: &str, numbers: &[i32], now: DateTime<Utc>) -> Reservation {
        let new = NewReservation {
            id: ReservationId::new(),
            code: "SL191026TEST".to_string(),
            user_id: UserId::new(),
            site: SiteSnapshot {
                id: SiteId::new(),
                slug: "silicom-lan-center".to_string(),
                name: "Silicom LAN Center".to_string(),
            },
            booths: numbers
                .iter()
                .map(|&number| BoothRef {
                    number,
                    booth_id: BoothId::new(),
                })
                .collect(),
            plan: plan_for(plan_id).expect("plan"),
            payment_method: PaymentMethod::default(),
        };
        Reservation::book(new, now).expect("book")
    }

    #[test]
    fn test_booking_arithmetic() {
        let now = Utc::now();
        let r = booked("S/5", &[3, 4], now);
        assert_eq!(r.price.unit, 5);
        assert_eq!(r.price.total, 10);
        assert_eq!(r.points.per_booth, 12);
        assert_eq!(r.points.total, 12);
        assert_eq!(r.schedule.end, now + Duration::minutes(180));
        assert_eq!(r.state, ReservationState::Active);
        assert_eq!(r.history.len(), 1);
        assert_eq!(r.payment.method, PaymentMethod::Yape);
        assert_eq!(r.duration.text, "3 horas");
    }

    #[test]
    fn test_extend_moves_end_and_points() {
        let now = Utc::now();
        let mut r = booked("S/5", &[3, 4], now);
        let plan = plan_for("S/2").expect("plan");
        let ext = r.extend(plan, now + Duration::minutes(10)).expect("extend");

        assert_eq!(ext.extra_points, 4);
        assert_eq!(r.schedule.end, now + Duration::minutes(240));
        assert_eq!(r.points.total, 16);
        assert_eq!(r.extensions.len(), 1);
        assert_eq!(r.state, ReservationState::Active);
        let states: Vec<_> = r.history.iter().map(|h| h.state).collect();
        assert_eq!(
            states,
            vec![
                ReservationState::Active,
                ReservationState::Extended,
                ReservationState::Active
            ]
        );
        assert_eq!(r.total_minutes(), 240);
        assert_eq!(r.extensions[0].extra_price, 2);
        assert_eq!(r.total_spent(), 12);
    }

    #[test]
    fn test_window_end_is_still_inside_the_window() {
        let now = Utc::now();
        let mut r = booked("S/1", &[1], now);
        let end = r.schedule.end;
        assert!(!r.is_due(end));
        assert_eq!(r.time_remaining_minutes(end), 0);
        r.check_in(end).expect("check in at the last instant");
        assert!(r.is_due(end + Duration::milliseconds(1)));
    }

    #[test]
    fn test_lapse_completes_active_reservation() {
        let now = Utc::now();
        let mut r = booked("S/1", &[1], now);
        let later = now + Duration::minutes(31);
        assert!(r.is_due(later));
        assert_eq!(r.lapse(later).expect("lapse"), ReservationState::Completed);
        assert_eq!(r.schedule.finished_at, Some(later));
        assert!(!r.is_due(later));
        assert!(r.lapse(later).is_err());
    }

    #[test]
    fn test_terminal_reservation_cannot_extend() {
        let now = Utc::now();
        let mut r = booked("S/2", &[1], now);
        r.transition(ReservationState::Cancelled, "user request", now)
            .expect("cancel");
        let plan = plan_for("S/1").expect("plan");
        assert!(r.extend(plan, now).is_err());
        assert_eq!(r.time_remaining_minutes(now), 0);
    }

    #[test]
    fn test_empty_booking_rejected() {
        let now = Utc::now();
        let new = NewReservation {
            id: ReservationId::new(),
            code: "X".to_string(),
            user_id: UserId::new(),
            site: SiteSnapshot {
                id: SiteId::new(),
                slug: "s".to_string(),
                name: "S".to_string(),
            },
            booths: Vec::new(),
            plan: plan_for("S/1").expect("plan"),
            payment_method: PaymentMethod::Cash,
        };
        assert!(Reservation::book(new, now).is_err());
    }
}
