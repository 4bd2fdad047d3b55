//! Site catalog, plan listing and booth setup.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::Serialize;
use tracing::info;

use lanhub_core::config::ReservationConfig;
use lanhub_core::error::AppError;
use lanhub_core::traits::Clock;
use lanhub_core::types::SiteId;
use lanhub_database::store::{BoothStore, SiteStore};
use lanhub_entity::booth::{Booth, BoothSummary};
use lanhub_entity::plan::{CURRENCY, PLANS, PaymentMethod, Plan};
use lanhub_entity::site::Site;

use super::seed::reference_sites;
use crate::context::RequestContext;
use crate::sweeper::ExpirationSweeper;

/// A site with its live booth counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteOverview {
    /// The site record.
    #[serde(flatten)]
    pub site: Site,
    /// Free and total booths.
    pub booths: BoothSummary,
    /// Whether the site is open right now, in local time.
    pub is_open: bool,
}

/// A site with its counts and every booth.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDetail {
    /// Site and counts.
    #[serde(flatten)]
    pub overview: SiteOverview,
    /// Booths ordered by number.
    pub booth_list: Vec<Booth>,
}

/// How many records a catalog seed created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    /// New sites.
    pub sites_created: usize,
    /// New booths.
    pub booths_created: usize,
}

/// One plan as shown to customers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    /// Plan id, e.g. `S/5`.
    pub id: &'static str,
    /// Price per booth.
    pub price: i64,
    /// Currency code.
    pub currency: &'static str,
    /// Session length in minutes.
    pub duration_minutes: i64,
    /// Session length as display text.
    pub duration: String,
    /// Points earned per booth.
    pub points: i64,
    /// Bonus description.
    pub bonus: &'static str,
}

impl From<&Plan> for PlanView {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id,
            price: plan.unit_price(),
            currency: CURRENCY,
            duration_minutes: plan.duration_minutes,
            duration: plan.duration_text(),
            points: plan.base_points,
            bonus: plan.bonus,
        }
    }
}

/// Plans and accepted payment methods.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCatalog {
    /// Every plan.
    pub plans: Vec<PlanView>,
    /// Payment methods offered at checkout.
    pub payment_methods: Vec<PaymentMethod>,
}

/// Reads and maintains the site catalog.
#[derive(Debug, Clone)]
pub struct CatalogService {
    sites: Arc<dyn SiteStore>,
    booths: Arc<dyn BoothStore>,
    sweeper: Arc<ExpirationSweeper>,
    clock: Arc<dyn Clock>,
    config: ReservationConfig,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(
        sites: Arc<dyn SiteStore>,
        booths: Arc<dyn BoothStore>,
        sweeper: Arc<ExpirationSweeper>,
        clock: Arc<dyn Clock>,
        config: ReservationConfig,
    ) -> Self {
        Self {
            sites,
            booths,
            sweeper,
            clock,
            config,
        }
    }

    /// Active sites with free/total counts and opening status.
    pub async fn list_sites(&self) -> Result<Vec<SiteOverview>, AppError> {
        self.sweeper.sweep(None).await?;
        let sites = self.sites.list_active().await?;
        try_join_all(sites.into_iter().map(|site| self.overview(site))).await
    }

    /// One site by slug, with its booths.
    pub async fn get_site(&self, slug: &str) -> Result<SiteDetail, AppError> {
        let site = self
            .sites
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Site '{slug}' not found")))?;
        self.sweeper.sweep(Some(site.id)).await?;
        let booth_list = self.booths.list(Some(site.id)).await?;
        Ok(SiteDetail {
            overview: self.overview(site).await?,
            booth_list,
        })
    }

    /// Resolve a site reference given as a UUID or a slug.
    ///
    /// `None` resolves to the configured default site.
    pub async fn resolve_site(&self, reference: Option<&str>) -> Result<Site, AppError> {
        let reference = reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(&self.config.default_site_slug);
        let found = match uuid::Uuid::parse_str(reference) {
            Ok(id) => self.sites.find_by_id(SiteId::from_uuid(id)).await?,
            Err(_) => self.sites.find_by_slug(reference).await?,
        };
        found.ok_or_else(|| AppError::not_found(format!("Site '{reference}' not found")))
    }

    /// Create the reference sites and their booths.
    ///
    /// Sites that already exist are left alone, so running it twice creates
    /// nothing the second time.
    pub async fn seed_catalog(&self, ctx: &RequestContext) -> Result<SeedReport, AppError> {
        ctx.require_admin()?;
        let now = self.clock.now();
        let mut report = SeedReport::default();

        for create in reference_sites() {
            if self.sites.find_by_slug(&create.slug).await?.is_some() {
                continue;
            }
            let site = create.into_site(now);
            self.sites.insert(&site).await?;
            let booths = fresh_booths(&site, now);
            self.booths.insert_many(&booths).await?;

            info!(site = %site.slug, booths = booths.len(), "Site seeded");
            report.sites_created += 1;
            report.booths_created += booths.len();
        }
        Ok(report)
    }

    /// Delete a site's booths and recreate them all as free.
    ///
    /// Reservations are not touched; any still holding these booths are
    /// closed by the next sweep.
    pub async fn reset_site_booths(
        &self,
        ctx: &RequestContext,
        site_ref: &str,
    ) -> Result<Vec<Booth>, AppError> {
        ctx.require_admin()?;
        let site = self.resolve_site(Some(site_ref)).await?;
        let now = self.clock.now();

        let removed = self.booths.delete_by_site(site.id).await?;
        let booths = fresh_booths(&site, now);
        self.booths.insert_many(&booths).await?;

        info!(
            site = %site.slug,
            removed,
            created = booths.len(),
            user_id = %ctx.user_id,
            "Site booths reset"
        );
        Ok(booths)
    }

    /// Every plan with the accepted payment methods.
    pub fn list_plans(&self) -> PlanCatalog {
        PlanCatalog {
            plans: PLANS.iter().map(PlanView::from).collect(),
            payment_methods: PaymentMethod::ADVERTISED.to_vec(),
        }
    }

    /// The reservation settings this catalog was built with.
    pub fn config(&self) -> &ReservationConfig {
        &self.config
    }

    async fn overview(&self, site: Site) -> Result<SiteOverview, AppError> {
        let booths = self.booths.summary(site.id).await?;
        let is_open = site.is_open_at(self.clock.now(), self.config.local_offset());
        Ok(SiteOverview {
            site,
            booths,
            is_open,
        })
    }
}

fn fresh_booths(site: &Site, now: chrono::DateTime<chrono::Utc>) -> Vec<Booth> {
    (1..=site.booth_count)
        .map(|number| Booth::new(site.id, number, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lanhub_core::ErrorKind;
    use lanhub_core::traits::ManualClock;
    use lanhub_database::Stores;
    use lanhub_entity::user::UserRole;

    use super::*;

    fn service(clock: ManualClock) -> CatalogService {
        let stores = Stores::memory();
        let clock: Arc<dyn Clock> = Arc::new(clock);
        let sweeper = Arc::new(ExpirationSweeper::new(
            stores.reservations.clone(),
            stores.booths.clone(),
            stores.users.clone(),
            clock.clone(),
        ));
        CatalogService::new(
            stores.sites,
            stores.booths,
            sweeper,
            clock,
            ReservationConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let catalog = service(ManualClock::new(Utc::now()));
        let ctx = RequestContext::system();

        let first = catalog.seed_catalog(&ctx).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                sites_created: 3,
                booths_created: 24
            }
        );
        let second = catalog.seed_catalog(&ctx).await.unwrap();
        assert_eq!(second, SeedReport::default());
    }

    #[tokio::test]
    async fn test_seed_requires_admin() {
        let catalog = service(ManualClock::new(Utc::now()));
        let ctx = RequestContext::new(
            lanhub_core::types::UserId::new(),
            UserRole::Customer,
            "someone",
        );
        let err = catalog.seed_catalog(&ctx).await.unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
    }

    #[tokio::test]
    async fn test_list_sites_reports_counts_and_hours() {
        // Wednesday 15:00 in Lima is 20:00 UTC.
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 14, 20, 0, 0).unwrap());
        let catalog = service(clock.clone());
        catalog.seed_catalog(&RequestContext::system()).await.unwrap();

        let sites = catalog.list_sites().await.unwrap();
        assert_eq!(sites.len(), 3);
        let shadow = sites.iter().find(|s| s.site.slug == "shadowlan").unwrap();
        assert_eq!(shadow.booths, BoothSummary { free: 10, total: 10 });
        assert!(shadow.is_open);

        // 04:00 local the next day.
        clock.advance(chrono::Duration::hours(13));
        let sites = catalog.list_sites().await.unwrap();
        assert!(sites.iter().all(|s| !s.is_open));
    }

    #[tokio::test]
    async fn test_resolve_site_by_slug_id_and_default() {
        let catalog = service(ManualClock::new(Utc::now()));
        catalog.seed_catalog(&RequestContext::system()).await.unwrap();

        let by_default = catalog.resolve_site(None).await.unwrap();
        assert_eq!(by_default.slug, "silicom-lan-center");

        let by_id = catalog
            .resolve_site(Some(&by_default.id.to_string()))
            .await
            .unwrap();
        assert_eq!(by_id.id, by_default.id);

        let err = catalog.resolve_site(Some("nowhere")).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_reset_recreates_free_booths() {
        let catalog = service(ManualClock::new(Utc::now()));
        let ctx = RequestContext::system();
        catalog.seed_catalog(&ctx).await.unwrap();

        let booths = catalog
            .reset_site_booths(&ctx, "linux-cybercafe")
            .await
            .unwrap();
        assert_eq!(booths.len(), 6);
        assert!(booths.iter().all(Booth::is_free));

        let detail = catalog.get_site("linux-cybercafe").await.unwrap();
        assert_eq!(detail.booth_list.len(), 6);
        assert_eq!(detail.overview.booths.total, 6);
    }

    #[test]
    fn test_plan_catalog() {
        let catalog = service(ManualClock::new(Utc::now()));
        let plans = catalog.list_plans();
        assert_eq!(plans.plans.len(), 3);
        assert_eq!(plans.plans[2].price, 5);
        assert_eq!(plans.plans[2].duration, "3 horas");
        assert_eq!(plans.payment_methods.len(), 3);
    }
}
