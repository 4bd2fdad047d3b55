//! Reservation ledger service.
//!
//! Booking is a short saga over three stores: the reservation is inserted
//! first, then its booths are claimed in one all-or-nothing step, then the
//! customer's points are credited. A failed claim deletes the reservation
//! again; a failed credit keeps it and flags `points.awarded = false`.
//!
//! Every later change goes through [`ReservationStore::update`] with the
//! version that was read, so two writers racing on the same reservation
//! (an extension and a sweep, say) cannot both win.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};

use lanhub_core::error::{AppError, ErrorKind};
use lanhub_core::traits::Clock;
use lanhub_core::types::{ReservationId, UserId};
use lanhub_database::store::{BoothStore, ClaimOutcome, ReservationStore, UserStore};
use lanhub_entity::booth::{Booth, BoothClaim};
use lanhub_entity::plan::{PaymentMethod, plan_for};
use lanhub_entity::reservation::{
    BoothRef, NewReservation, Reservation, ReservationState, SiteSnapshot, generate_code,
};
use lanhub_entity::user::UserActivity;

use crate::catalog::CatalogService;
use crate::context::RequestContext;
use crate::rewards::RewardsService;
use crate::sweeper::ExpirationSweeper;

/// Attempts at drawing an unused reservation code.
const CODE_ATTEMPTS: usize = 3;

/// A booking request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    /// Who the booking is for. Defaults to the caller; only admins may
    /// book for someone else.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Site id or slug. Defaults to the configured site.
    #[serde(default)]
    pub site_id: Option<String>,
    /// Booth numbers within the site.
    pub booth_numbers: Vec<i32>,
    /// Plan id, e.g. `S/5`.
    pub plan_id: String,
    /// How the booking was paid.
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Books, extends, cancels and closes reservations.
#[derive(Debug, Clone)]
pub struct ReservationService {
    reservations: Arc<dyn ReservationStore>,
    booths: Arc<dyn BoothStore>,
    users: Arc<dyn UserStore>,
    catalog: Arc<CatalogService>,
    rewards: Arc<RewardsService>,
    sweeper: Arc<ExpirationSweeper>,
    clock: Arc<dyn Clock>,
}

impl ReservationService {
    /// Creates a new reservation service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        booths: Arc<dyn BoothStore>,
        users: Arc<dyn UserStore>,
        catalog: Arc<CatalogService>,
        rewards: Arc<RewardsService>,
        sweeper: Arc<ExpirationSweeper>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reservations,
            booths,
            users,
            catalog,
            rewards,
            sweeper,
            clock,
        }
    }

    /// Book booths for a paid session starting now.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateReservation,
    ) -> Result<Reservation, AppError> {
        let numbers = checked_numbers(&req.booth_numbers)?;
        let plan = plan_for(&req.plan_id)?;

        let user_id = req.user_id.unwrap_or(ctx.user_id);
        ctx.require_self_or_admin(user_id)?;
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }

        let site = self.catalog.resolve_site(req.site_id.as_deref()).await?;
        if !site.active {
            return Err(AppError::validation(format!(
                "Site '{}' is not taking bookings",
                site.slug
            )));
        }

        self.sweeper.sweep(Some(site.id)).await?;
        let booths = self.booths.find_by_numbers(site.id, &numbers).await?;
        let unavailable = unavailable_numbers(&numbers, &booths);
        if !unavailable.is_empty() {
            return Err(AppError::booth_unavailable(&numbers, &unavailable));
        }

        let now = self.clock.now();
        let refs: Vec<BoothRef> = booths
            .iter()
            .map(|b| BoothRef {
                number: b.number,
                booth_id: b.id,
            })
            .collect();
        let snapshot = SiteSnapshot {
            id: site.id,
            slug: site.slug.clone(),
            name: site.name.clone(),
        };
        let local_date = now
            .with_timezone(&self.catalog.config().local_offset())
            .date_naive();

        let mut reservation = self
            .insert_with_fresh_code(now, local_date, |code| NewReservation {
                id: ReservationId::new(),
                code,
                user_id,
                site: snapshot.clone(),
                booths: refs.clone(),
                plan,
                payment_method: req.payment_method,
            })
            .await?;

        let claim = BoothClaim {
            reservation_id: reservation.id,
            user_id,
            start: reservation.schedule.start,
            end: reservation.schedule.end,
        };
        match self.booths.claim(&reservation.booth_ids(), &claim, now).await {
            Ok(ClaimOutcome::Claimed) => {}
            Ok(ClaimOutcome::Conflict { unavailable }) => {
                self.undo_booking(reservation.id).await;
                let taken: Vec<i32> = booths
                    .iter()
                    .filter(|b| unavailable.contains(&b.id))
                    .map(|b| b.number)
                    .collect();
                return Err(AppError::booth_unavailable(&numbers, &taken));
            }
            Err(e) => {
                self.undo_booking(reservation.id).await;
                return Err(e);
            }
        }

        if let Err(e) = self
            .rewards
            .credit(user_id, reservation.points.total, "booking")
            .await
        {
            error!(
                reservation_id = %reservation.id,
                user_id = %user_id,
                points = reservation.points.total,
                error = %e,
                "Failed to credit booking points; flagged for reconciliation"
            );
            self.flag_unawarded(&mut reservation).await;
        }

        if let Err(e) = self
            .users
            .record_activity(user_id, UserActivity::Booked { at: now })
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to record booking in user statistics");
        }

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            user_id = %user_id,
            site = %reservation.site.slug,
            booths = ?reservation.booth_numbers(),
            plan = %reservation.plan_id,
            total = reservation.price.total,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Add a plan's time to an active reservation.
    pub async fn extend(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
        plan_id: &str,
    ) -> Result<Reservation, AppError> {
        let plan = plan_for(plan_id)?;
        let mut reservation = self.load(ctx, id).await?;
        let now = self.clock.now();
        self.reject_if_due(&reservation, now).await?;

        let expected = reservation.version;
        let previous_end = reservation.schedule.end;
        let extension = reservation.extend(plan, now)?;

        // Booths move first so they never end before the stored reservation.
        self.booths
            .extend_session(reservation.id, reservation.schedule.end, now)
            .await?;
        if let Err(e) = self.save(&mut reservation, expected).await {
            if let Err(restore) = self
                .booths
                .extend_session(reservation.id, previous_end, now)
                .await
            {
                error!(
                    reservation_id = %reservation.id,
                    error = %restore,
                    "Failed to restore booth sessions after a rejected extension"
                );
            }
            return Err(e);
        }

        if let Err(e) = self
            .rewards
            .credit(reservation.user_id, extension.extra_points, "extension")
            .await
        {
            error!(
                reservation_id = %reservation.id,
                points = extension.extra_points,
                error = %e,
                "Failed to credit extension points; flagged for reconciliation"
            );
            self.flag_unawarded(&mut reservation).await;
        }

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            plan = %plan.id,
            new_end = %reservation.schedule.end,
            "Reservation extended"
        );
        Ok(reservation)
    }

    /// Cancel a reservation and free its booths.
    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
        reason: Option<String>,
    ) -> Result<Reservation, AppError> {
        let mut reservation = self.load(ctx, id).await?;
        let now = self.clock.now();

        let expected = reservation.version;
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Cancelled by user".to_string());
        reservation.transition(ReservationState::Cancelled, reason, now)?;
        self.save(&mut reservation, expected).await?;

        let released = self
            .booths
            .release_for_reservation(reservation.id, now)
            .await?;
        if let Err(e) = self
            .users
            .record_activity(reservation.user_id, UserActivity::Cancelled)
            .await
        {
            warn!(
                user_id = %reservation.user_id,
                error = %e,
                "Failed to record cancellation in user statistics"
            );
        }

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            released,
            user_id = %ctx.user_id,
            "Reservation cancelled"
        );
        Ok(reservation)
    }

    /// Close a reservation now, as the sweeper would once its window ends.
    pub async fn mark_expired(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
    ) -> Result<Reservation, AppError> {
        ctx.require_admin()?;
        let reservation = self.load(ctx, id).await?;
        if reservation.state.is_terminal() {
            return Err(AppError::conflict(format!(
                "Reservation {} is already {}",
                reservation.code, reservation.state
            )));
        }
        let code = reservation.code.clone();
        match self.sweeper.close(reservation, self.clock.now()).await? {
            Some(closed) => {
                info!(
                    reservation_id = %id,
                    state = %closed.reservation.state,
                    booths_released = closed.booths_released,
                    user_id = %ctx.user_id,
                    "Reservation closed by administrator"
                );
                Ok(closed.reservation)
            }
            None => Err(stale(&code)),
        }
    }

    /// Record that the customer has sat down; their booths become occupied.
    pub async fn check_in(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
    ) -> Result<Reservation, AppError> {
        let mut reservation = self.load(ctx, id).await?;
        let now = self.clock.now();
        self.reject_if_due(&reservation, now).await?;

        let first = reservation.schedule.checked_in_at.is_none();
        let expected = reservation.version;
        reservation.check_in(now)?;
        if first {
            self.save(&mut reservation, expected).await?;
        }
        let occupied = self.booths.occupy(reservation.id, now).await?;

        info!(
            reservation_id = %reservation.id,
            code = %reservation.code,
            occupied,
            "Customer checked in"
        );
        Ok(reservation)
    }

    /// One reservation by id or code, closed first if its window is over.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        reference: &str,
    ) -> Result<Reservation, AppError> {
        let found = match reference.parse::<ReservationId>() {
            Ok(id) => self.reservations.find_by_id(id).await?,
            Err(_) => self.reservations.find_by_code(reference).await?,
        };
        let reservation = found
            .ok_or_else(|| AppError::not_found(format!("Reservation '{reference}' not found")))?;
        ctx.require_self_or_admin(reservation.user_id)?;

        let now = self.clock.now();
        if !reservation.is_due(now) {
            return Ok(reservation);
        }
        let id = reservation.id;
        match self.sweeper.close(reservation, now).await? {
            Some(closed) => Ok(closed.reservation),
            None => self.load(ctx, id).await,
        }
    }

    /// A user's reservations, newest first, after closing any that are due.
    ///
    /// `user_id` defaults to the caller; only admins may list someone else's.
    pub async fn list_for_user(
        &self,
        ctx: &RequestContext,
        user_id: Option<UserId>,
    ) -> Result<Vec<Reservation>, AppError> {
        let user_id = user_id.unwrap_or(ctx.user_id);
        ctx.require_self_or_admin(user_id)?;
        self.sweeper.sweep(None).await?;
        let limit = i64::from(self.catalog.config().user_listing_limit);
        self.reservations.list_by_user(user_id, limit).await
    }

    async fn load(&self, ctx: &RequestContext, id: ReservationId) -> Result<Reservation, AppError> {
        let reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))?;
        ctx.require_self_or_admin(reservation.user_id)?;
        Ok(reservation)
    }

    /// Close a reservation whose window has passed and refuse the operation.
    async fn reject_if_due(
        &self,
        reservation: &Reservation,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if !reservation.is_due(now) {
            return Ok(());
        }
        self.sweeper.close(reservation.clone(), now).await?;
        Err(AppError::conflict(format!(
            "Reservation {} has already ended",
            reservation.code
        )))
    }

    async fn save(&self, reservation: &mut Reservation, expected: i32) -> Result<(), AppError> {
        if !self.reservations.update(reservation, expected).await? {
            return Err(stale(&reservation.code));
        }
        reservation.version = expected + 1;
        Ok(())
    }

    async fn insert_with_fresh_code<F>(
        &self,
        now: DateTime<Utc>,
        date: NaiveDate,
        build: F,
    ) -> Result<Reservation, AppError>
    where
        F: Fn(String) -> NewReservation,
    {
        let mut attempt = 1;
        loop {
            let reservation = Reservation::book(build(generate_code(date)), now)?;
            match self.reservations.insert(&reservation).await {
                Ok(()) => return Ok(reservation),
                Err(e) if e.is(ErrorKind::Conflict) && attempt < CODE_ATTEMPTS => {
                    warn!(code = %reservation.code, attempt, "Reservation code collision, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn undo_booking(&self, id: ReservationId) {
        match self.reservations.delete(id).await {
            Ok(_) => warn!(reservation_id = %id, "Booking rolled back after failed booth claim"),
            Err(e) => error!(
                reservation_id = %id,
                error = %e,
                "Failed to roll back booking; reservation left without booths"
            ),
        }
    }

    async fn flag_unawarded(&self, reservation: &mut Reservation) {
        let expected = reservation.version;
        reservation.points.awarded = false;
        if let Err(e) = self.save(reservation, expected).await {
            error!(
                reservation_id = %reservation.id,
                error = %e,
                "Failed to flag reservation points as unawarded"
            );
        }
    }
}

/// Reject empty, duplicate and non-positive booth numbers.
fn checked_numbers(numbers: &[i32]) -> Result<Vec<i32>, AppError> {
    if numbers.is_empty() {
        return Err(AppError::validation("At least one booth is required"));
    }
    if let Some(n) = numbers.iter().find(|n| **n < 1) {
        return Err(AppError::validation(format!("Invalid booth number {n}")));
    }
    let mut seen = HashSet::new();
    if let Some(n) = numbers.iter().find(|n| !seen.insert(**n)) {
        return Err(AppError::validation(format!("Booth {n} requested more than once")));
    }
    Ok(numbers.to_vec())
}

/// Requested numbers that are missing from `booths` or not free, sorted.
fn unavailable_numbers(requested: &[i32], booths: &[Booth]) -> Vec<i32> {
    let mut missing: Vec<i32> = requested
        .iter()
        .filter(|n| !booths.iter().any(|b| b.number == **n && b.is_free()))
        .copied()
        .collect();
    missing.sort_unstable();
    missing
}

fn stale(code: &str) -> AppError {
    AppError::conflict(format!(
        "Reservation {code} was changed by another request; reload and retry"
    ))
}
