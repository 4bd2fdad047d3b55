//! Reservation repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use lanhub_core::error::{AppError, ErrorKind};
use lanhub_core::result::AppResult;
use lanhub_core::types::{ReservationId, SiteId, UserId};
use lanhub_entity::plan::PaymentMethod;
use lanhub_entity::reservation::{
    BoothRef, DurationInfo, Extension, Payment, Points, Price, Reservation, ReservationState,
    Schedule, SiteSnapshot, StateChange,
};

use super::insert_error;
use crate::store::ReservationStore;

/// Flat row shape of the `reservations` table.
#[derive(Debug, FromRow)]
struct ReservationRow {
    id: ReservationId,
    code: String,
    user_id: UserId,
    site_id: SiteId,
    site_slug: String,
    site_name: String,
    booths: Json<Vec<BoothRef>>,
    booth_count: i32,
    plan_id: String,
    price_unit: i64,
    price_total: i64,
    currency: String,
    duration_minutes: i64,
    duration_text: String,
    booked_at: DateTime<Utc>,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    checked_in_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    points_base: i64,
    points_per_booth: i64,
    points_bonus: i64,
    points_total: i64,
    points_awarded: bool,
    bonus: String,
    payment_method: PaymentMethod,
    payment_confirmed: bool,
    paid_at: Option<DateTime<Utc>>,
    state: ReservationState,
    history: Json<Vec<StateChange>>,
    extensions: Json<Vec<Extension>>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            user_id: row.user_id,
            site: SiteSnapshot {
                id: row.site_id,
                slug: row.site_slug,
                name: row.site_name,
            },
            booths: row.booths.0,
            booth_count: row.booth_count,
            plan_id: row.plan_id,
            price: Price {
                unit: row.price_unit,
                total: row.price_total,
                currency: row.currency,
            },
            duration: DurationInfo {
                minutes: row.duration_minutes,
                text: row.duration_text,
            },
            schedule: Schedule {
                booked_at: row.booked_at,
                start: row.start_at,
                end: row.end_at,
                checked_in_at: row.checked_in_at,
                finished_at: row.finished_at,
            },
            points: Points {
                base: row.points_base,
                per_booth: row.points_per_booth,
                bonus: row.points_bonus,
                total: row.points_total,
                awarded: row.points_awarded,
            },
            bonus: row.bonus,
            payment: Payment {
                method: row.payment_method,
                confirmed: row.payment_confirmed,
                paid_at: row.paid_at,
            },
            state: row.state,
            history: row.history.0,
            extensions: row.extensions.0,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the reservation ledger.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Create a new reservation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn list_error(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to list reservations", e)
}

const NON_TERMINAL: &str = "state NOT IN ('completed', 'cancelled', 'expired')";

#[async_trait]
impl ReservationStore for ReservationRepository {
    async fn insert(&self, r: &Reservation) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO reservations (id, code, user_id, site_id, site_slug, site_name, booths, \
             booth_count, plan_id, price_unit, price_total, currency, duration_minutes, \
             duration_text, booked_at, start_at, end_at, checked_in_at, finished_at, \
             points_base, points_per_booth, points_bonus, points_total, points_awarded, bonus, \
             payment_method, payment_confirmed, paid_at, state, history, extensions, version, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, \
             $33, $34)",
        )
        .bind(r.id)
        .bind(&r.code)
        .bind(r.user_id)
        .bind(r.site.id)
        .bind(&r.site.slug)
        .bind(&r.site.name)
        .bind(Json(&r.booths))
        .bind(r.booth_count)
        .bind(&r.plan_id)
        .bind(r.price.unit)
        .bind(r.price.total)
        .bind(&r.price.currency)
        .bind(r.duration.minutes)
        .bind(&r.duration.text)
        .bind(r.schedule.booked_at)
        .bind(r.schedule.start)
        .bind(r.schedule.end)
        .bind(r.schedule.checked_in_at)
        .bind(r.schedule.finished_at)
        .bind(r.points.base)
        .bind(r.points.per_booth)
        .bind(r.points.bonus)
        .bind(r.points.total)
        .bind(r.points.awarded)
        .bind(&r.bonus)
        .bind(r.payment.method)
        .bind(r.payment.confirmed)
        .bind(r.payment.paid_at)
        .bind(r.state)
        .bind(Json(&r.history))
        .bind(Json(&r.extensions))
        .bind(r.version)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "Reservation"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find reservation", e)
            })?;
        Ok(row.map(Reservation::from))
    }

    async fn find_by_code(&self, code: &str) -> AppResult<Option<Reservation>> {
        let row = sqlx::query_as::<_, ReservationRow>(
            "SELECT * FROM reservations WHERE code = UPPER($1)",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to find reservation by code",
                e,
            )
        })?;
        Ok(row.map(Reservation::from))
    }

    async fn list_by_user(&self, user_id: UserId, limit: i64) -> AppResult<Vec<Reservation>> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            "SELECT * FROM reservations WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(list_error)?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn list_due(&self, now: DateTime<Utc>) -> AppResult<Vec<Reservation>> {
        let sql = format!(
            "SELECT * FROM reservations WHERE {NON_TERMINAL} AND end_at < $1 ORDER BY end_at"
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(list_error)?;
        Ok(rows.into_iter().map(Reservation::from).collect())
    }

    async fn update(&self, r: &Reservation, expected_version: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE reservations SET end_at = $3, checked_in_at = $4, finished_at = $5, \
             points_total = $6, points_awarded = $7, payment_confirmed = $8, paid_at = $9, \
             state = $10, history = $11, extensions = $12, updated_at = $13, \
             version = $2 + 1 \
             WHERE id = $1 AND version = $2",
        )
        .bind(r.id)
        .bind(expected_version)
        .bind(r.schedule.end)
        .bind(r.schedule.checked_in_at)
        .bind(r.schedule.finished_at)
        .bind(r.points.total)
        .bind(r.points.awarded)
        .bind(r.payment.confirmed)
        .bind(r.payment.paid_at)
        .bind(r.state)
        .bind(Json(&r.history))
        .bind(Json(&r.extensions))
        .bind(r.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update reservation", e)
        })?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: ReservationId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete reservation", e)
            })?;
        Ok(result.rows_affected() == 1)
    }
}
