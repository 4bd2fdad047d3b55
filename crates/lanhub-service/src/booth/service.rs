//! Booth registry service.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use lanhub_core::error::AppError;
use lanhub_core::traits::Clock;
use lanhub_core::types::{BoothId, ReservationId};
use lanhub_database::store::BoothStore;
use lanhub_entity::booth::{Booth, BoothState, BoothSummary};

use crate::catalog::CatalogService;
use crate::context::RequestContext;
use crate::sweeper::ExpirationSweeper;

/// A booth with the minutes left in its session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothView {
    /// The booth record.
    #[serde(flatten)]
    pub booth: Booth,
    /// Whole minutes until the session ends; 0 without a session.
    pub time_remaining: i64,
}

/// Booths of one site, or of every site, with counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothListing {
    /// Booths ordered by (site, number).
    pub booths: Vec<BoothView>,
    /// Free and total counts over `booths`.
    pub summary: BoothSummary,
}

/// Outcome of an administrative release.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseReport {
    /// Slug of the site the booths belong to.
    pub site: String,
    /// Booth numbers asked for.
    pub requested: Vec<i32>,
    /// Booths that were held and are now free.
    pub released: u64,
    /// Reservations closed because they held a released booth.
    pub reservations_closed: u64,
}

/// Lists and administers booths.
#[derive(Debug, Clone)]
pub struct BoothService {
    booths: Arc<dyn BoothStore>,
    catalog: Arc<CatalogService>,
    sweeper: Arc<ExpirationSweeper>,
    clock: Arc<dyn Clock>,
}

impl BoothService {
    /// Creates a new booth service.
    pub fn new(
        booths: Arc<dyn BoothStore>,
        catalog: Arc<CatalogService>,
        sweeper: Arc<ExpirationSweeper>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            booths,
            catalog,
            sweeper,
            clock,
        }
    }

    /// Sweep, then list booths, optionally for one site.
    pub async fn list_booths(&self, site_ref: Option<&str>) -> Result<BoothListing, AppError> {
        let site_id = match site_ref {
            Some(reference) => Some(self.catalog.resolve_site(Some(reference)).await?.id),
            None => None,
        };
        self.sweeper.sweep(site_id).await?;

        let now = self.clock.now();
        let booths: Vec<BoothView> = self
            .booths
            .list(site_id)
            .await?
            .into_iter()
            .map(|booth| BoothView {
                time_remaining: booth.time_remaining_minutes(now),
                booth,
            })
            .collect();
        let summary = BoothSummary {
            free: booths.iter().filter(|v| v.booth.is_free()).count() as i64,
            total: booths.len() as i64,
        };
        Ok(BoothListing { booths, summary })
    }

    /// One booth with its remaining time.
    pub async fn get_booth(&self, id: BoothId) -> Result<BoothView, AppError> {
        let booth = self
            .booths
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Booth {id} not found")))?;
        Ok(BoothView {
            time_remaining: booth.time_remaining_minutes(self.clock.now()),
            booth,
        })
    }

    /// Free booths by number, whatever holds them.
    ///
    /// A reservation holding any of the booths is closed first, which frees
    /// every booth it holds. Booths that are already free are skipped.
    pub async fn release_booths(
        &self,
        ctx: &RequestContext,
        numbers: &[i32],
        site_ref: Option<&str>,
    ) -> Result<ReleaseReport, AppError> {
        ctx.require_admin()?;
        if numbers.is_empty() {
            return Err(AppError::validation("At least one booth number is required"));
        }
        let site = self.catalog.resolve_site(site_ref).await?;
        let booths = self.booths.find_by_numbers(site.id, numbers).await?;
        let now = self.clock.now();

        let mut holders: Vec<ReservationId> = Vec::new();
        for id in booths.iter().filter_map(|b| b.active_reservation_id) {
            if !holders.contains(&id) {
                holders.push(id);
            }
        }

        let mut released = 0;
        let mut reservations_closed = 0;
        for id in holders {
            if let Some(closed) = self
                .sweeper
                .end_holder(id, "Booths released by administrator", now)
                .await?
            {
                reservations_closed += 1;
                released += closed.booths_released;
            }
        }
        let ids: Vec<BoothId> = booths.iter().map(|b| b.id).collect();
        released += self.booths.release(&ids, now).await?;

        info!(
            site = %site.slug,
            booths = ?numbers,
            released,
            reservations_closed,
            user_id = %ctx.user_id,
            "Booths released by administrator"
        );
        Ok(ReleaseReport {
            site: site.slug,
            requested: numbers.to_vec(),
            released,
            reservations_closed,
        })
    }

    /// Put a booth no reservation holds into a manual state.
    pub async fn set_state(
        &self,
        ctx: &RequestContext,
        id: BoothId,
        state: BoothState,
    ) -> Result<BoothView, AppError> {
        ctx.require_admin()?;
        if !state.is_manual() {
            return Err(AppError::validation(format!(
                "Booth state can only be set to free, maintenance or out_of_service, not {state}"
            )));
        }
        let booth = self.get_booth(id).await?;
        if !self.booths.set_state(id, state, self.clock.now()).await? {
            return Err(AppError::conflict(format!(
                "Booth {} is held by a reservation ({})",
                booth.booth.number, booth.booth.state
            )));
        }
        info!(booth_id = %id, state = %state, user_id = %ctx.user_id, "Booth state changed");
        self.get_booth(id).await
    }
}

#[cfg(test)]
mod tests {
    use lanhub_core::ErrorKind;
    use lanhub_entity::plan::PaymentMethod;

    use super::*;
    use crate::reservation::CreateReservation;
    use crate::testing::Harness;

    async fn booth_id(h: &Harness, slug: &str, number: i32) -> BoothId {
        let site = h.catalog.resolve_site(Some(slug)).await.unwrap();
        h.stores
            .booths
            .find_by_numbers(site.id, &[number])
            .await
            .unwrap()[0]
            .id
    }

    #[tokio::test]
    async fn test_list_all_and_by_site() {
        let h = Harness::seeded().await;
        let all = h.booths.list_booths(None).await.unwrap();
        assert_eq!(all.summary, BoothSummary { free: 24, total: 24 });

        let shadow = h.booths.list_booths(Some("shadowlan")).await.unwrap();
        let numbers: Vec<i32> = shadow.booths.iter().map(|v| v.booth.number).collect();
        assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
        assert!(shadow.booths.iter().all(|v| v.time_remaining == 0));
    }

    #[tokio::test]
    async fn test_admin_release_frees_held_booths() {
        let h = Harness::seeded().await;
        let ctx = h.customer("u1").await;
        h.reservations
            .create(
                &ctx,
                CreateReservation {
                    user_id: None,
                    site_id: Some("shadowlan".to_string()),
                    booth_numbers: vec![1, 2],
                    plan_id: "S/2".to_string(),
                    payment_method: PaymentMethod::Plin,
                },
            )
            .await
            .unwrap();

        let err = h
            .booths
            .release_booths(&ctx, &[1, 2], Some("shadowlan"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authorization));

        let report = h
            .booths
            .release_booths(&RequestContext::system(), &[1, 2, 3], Some("shadowlan"))
            .await
            .unwrap();
        assert_eq!(report.released, 2);
        assert_eq!(report.reservations_closed, 1);
        let listing = h.booths.list_booths(Some("shadowlan")).await.unwrap();
        assert_eq!(listing.summary.free, 10);
    }

    #[tokio::test]
    async fn test_released_booth_has_a_single_holder() {
        let h = Harness::seeded().await;
        let first = h.customer("first").await;
        let second = h.customer("second").await;
        let booking = |numbers: Vec<i32>| CreateReservation {
            user_id: None,
            site_id: None,
            booth_numbers: numbers,
            plan_id: "S/5".to_string(),
            payment_method: PaymentMethod::Yape,
        };

        let original = h
            .reservations
            .create(&first, booking(vec![1, 2]))
            .await
            .unwrap();
        let report = h
            .booths
            .release_booths(&RequestContext::system(), &[1], None)
            .await
            .unwrap();
        assert_eq!(report.reservations_closed, 1);
        assert_eq!(report.released, 2);

        let closed = h
            .stores
            .reservations
            .find_by_id(original.id)
            .await
            .unwrap()
            .unwrap();
        assert!(closed.state.is_terminal());
        let err = h
            .reservations
            .check_in(&first, original.id)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));

        let rebooked = h
            .reservations
            .create(&second, booking(vec![1]))
            .await
            .unwrap();
        let booth = h
            .stores
            .booths
            .find_by_id(rebooked.booths[0].booth_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(booth.number, 1);
        assert_eq!(booth.active_reservation_id, Some(rebooked.id));
    }

    #[tokio::test]
    async fn test_set_state_only_on_unheld_booths() {
        let h = Harness::seeded().await;
        let admin = RequestContext::system();
        let id = booth_id(&h, "linux-cybercafe", 2).await;

        let view = h
            .booths
            .set_state(&admin, id, BoothState::Maintenance)
            .await
            .unwrap();
        assert_eq!(view.booth.state, BoothState::Maintenance);

        let err = h
            .booths
            .set_state(&admin, id, BoothState::Reserved)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Validation));

        h.booths.set_state(&admin, id, BoothState::Free).await.unwrap();

        let ctx = h.customer("u1").await;
        h.reservations
            .create(
                &ctx,
                CreateReservation {
                    user_id: None,
                    site_id: Some("linux-cybercafe".to_string()),
                    booth_numbers: vec![2],
                    plan_id: "S/1".to_string(),
                    payment_method: PaymentMethod::Cash,
                },
            )
            .await
            .unwrap();
        let err = h
            .booths
            .set_state(&admin, id, BoothState::OutOfService)
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_booth_in_maintenance_cannot_be_booked() {
        let h = Harness::seeded().await;
        let id = booth_id(&h, "silicom-lan-center", 4).await;
        h.booths
            .set_state(&RequestContext::system(), id, BoothState::OutOfService)
            .await
            .unwrap();

        let ctx = h.customer("u1").await;
        let err = h
            .reservations
            .create(
                &ctx,
                CreateReservation {
                    user_id: None,
                    site_id: None,
                    booth_numbers: vec![4],
                    plan_id: "S/1".to_string(),
                    payment_method: PaymentMethod::Yape,
                },
            )
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::BoothUnavailable));
    }

    #[tokio::test]
    async fn test_get_unknown_booth() {
        let h = Harness::seeded().await;
        let err = h.booths.get_booth(BoothId::new()).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }
}
