//! Site repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use lanhub_core::error::{AppError, ErrorKind};
use lanhub_core::result::AppResult;
use lanhub_core::types::SiteId;
use lanhub_entity::site::Site;

use super::insert_error;
use crate::store::SiteStore;

/// Repository for the site catalog.
#[derive(Debug, Clone)]
pub struct SiteRepository {
    pool: PgPool,
}

impl SiteRepository {
    /// Create a new site repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SiteStore for SiteRepository {
    async fn list_active(&self) -> AppResult<Vec<Site>> {
        sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE active ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list sites", e))
    }

    async fn find_by_id(&self, id: SiteId) -> AppResult<Option<Site>> {
        sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find site", e))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Site>> {
        sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find site by slug", e)
            })
    }

    async fn insert(&self, site: &Site) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sites (id, slug, name, description, street, district, city, region, \
             reference, booth_count, hours, active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(site.id)
        .bind(&site.slug)
        .bind(&site.name)
        .bind(&site.description)
        .bind(&site.address.street)
        .bind(&site.address.district)
        .bind(&site.address.city)
        .bind(&site.address.region)
        .bind(&site.address.reference)
        .bind(site.booth_count)
        .bind(Json(&site.hours))
        .bind(site.active)
        .bind(site.created_at)
        .bind(site.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "Site"))?;
        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sites")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count sites", e))
    }
}
