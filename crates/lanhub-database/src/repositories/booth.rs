//! Booth repository implementation.
//!
//! Claims lock the requested rows in id order and flip them with a single
//! `state = 'free'` guarded update, so two bookings can never hold the same
//! booth.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use lanhub_core::error::{AppError, ErrorKind};
use lanhub_core::result::AppResult;
use lanhub_core::types::{BoothId, ReservationId, SiteId};
use lanhub_entity::booth::{Booth, BoothClaim, BoothState, BoothSummary};

use super::insert_error;
use crate::store::{BoothStore, ClaimOutcome};

/// Assignments that return a held booth to `free`, folding the held time
/// (capped at the session end) into `usage_hours`. `$1` is the release time.
const RELEASE_SET: &str = "state = 'free', \
     usage_hours = usage_hours + GREATEST(COALESCE( \
         EXTRACT(EPOCH FROM (LEAST($1, session_end) - session_start))::DOUBLE PRECISION / 3600.0, \
         0), 0), \
     active_reservation_id = NULL, current_user_id = NULL, \
     session_start = NULL, session_end = NULL, \
     last_used_at = $1, updated_at = $1";

/// Repository for the booth registry.
#[derive(Debug, Clone)]
pub struct BoothRepository {
    pool: PgPool,
}

impl BoothRepository {
    /// Create a new booth repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl BoothStore for BoothRepository {
    async fn list(&self, site_id: Option<SiteId>) -> AppResult<Vec<Booth>> {
        sqlx::query_as::<_, Booth>(
            "SELECT * FROM booths WHERE ($1::UUID IS NULL OR site_id = $1) \
             ORDER BY site_id, number",
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list booths"))
    }

    async fn find_by_id(&self, id: BoothId) -> AppResult<Option<Booth>> {
        sqlx::query_as::<_, Booth>("SELECT * FROM booths WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find booth"))
    }

    async fn find_by_numbers(&self, site_id: SiteId, numbers: &[i32]) -> AppResult<Vec<Booth>> {
        sqlx::query_as::<_, Booth>(
            "SELECT * FROM booths WHERE site_id = $1 AND number = ANY($2) ORDER BY number",
        )
        .bind(site_id)
        .bind(numbers)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find booths by number"))
    }

    async fn summary(&self, site_id: SiteId) -> AppResult<BoothSummary> {
        let (free, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE state = 'free'), COUNT(*) \
             FROM booths WHERE site_id = $1",
        )
        .bind(site_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count booths"))?;
        Ok(BoothSummary { free, total })
    }

    async fn insert_many(&self, booths: &[Booth]) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;
        for booth in booths {
            sqlx::query(
                "INSERT INTO booths (id, site_id, number, state, total_reservations, \
                 usage_hours, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(booth.id)
            .bind(booth.site_id)
            .bind(booth.number)
            .bind(booth.state)
            .bind(booth.total_reservations)
            .bind(booth.usage_hours)
            .bind(booth.created_at)
            .bind(booth.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(e, "Booth"))?;
        }
        tx.commit()
            .await
            .map_err(db_error("Failed to commit booths"))?;
        Ok(())
    }

    async fn delete_by_site(&self, site_id: SiteId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM booths WHERE site_id = $1")
            .bind(site_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete booths"))?;
        Ok(result.rows_affected())
    }

    async fn claim(
        &self,
        booth_ids: &[BoothId],
        claim: &BoothClaim,
        now: DateTime<Utc>,
    ) -> AppResult<ClaimOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        sqlx::query("SELECT id FROM booths WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(booth_ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("Failed to lock booths"))?;

        let claimed: Vec<BoothId> = sqlx::query_scalar(
            "UPDATE booths SET state = 'reserved', active_reservation_id = $2, \
             current_user_id = $3, session_start = $4, session_end = $5, \
             total_reservations = total_reservations + 1, updated_at = $6 \
             WHERE id = ANY($1) AND state = 'free' RETURNING id",
        )
        .bind(booth_ids)
        .bind(claim.reservation_id)
        .bind(claim.user_id)
        .bind(claim.start)
        .bind(claim.end)
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to claim booths"))?;

        if claimed.len() != booth_ids.len() {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back claim"))?;
            let unavailable = booth_ids
                .iter()
                .filter(|id| !claimed.contains(id))
                .copied()
                .collect();
            return Ok(ClaimOutcome::Conflict { unavailable });
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit claim"))?;
        debug!(
            reservation_id = %claim.reservation_id,
            booths = claimed.len(),
            "Booths claimed"
        );
        Ok(ClaimOutcome::Claimed)
    }

    async fn release(&self, booth_ids: &[BoothId], now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(&format!(
            "UPDATE booths SET {RELEASE_SET} \
             WHERE id = ANY($2) AND state IN ('reserved', 'occupied')"
        ))
        .bind(now)
        .bind(booth_ids)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to release booths"))?;
        Ok(result.rows_affected())
    }

    async fn release_for_reservation(
        &self,
        reservation_id: ReservationId,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(&format!(
            "UPDATE booths SET {RELEASE_SET} \
             WHERE active_reservation_id = $2 AND state IN ('reserved', 'occupied')"
        ))
        .bind(now)
        .bind(reservation_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to release reservation booths"))?;
        Ok(result.rows_affected())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>, site_id: Option<SiteId>) -> AppResult<u64> {
        let result = sqlx::query(&format!(
            "UPDATE booths SET {RELEASE_SET} \
             WHERE state IN ('reserved', 'occupied') AND session_end < $1 \
             AND ($2::UUID IS NULL OR site_id = $2)"
        ))
        .bind(now)
        .bind(site_id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to sweep booths"))?;
        Ok(result.rows_affected())
    }

    async fn extend_session(
        &self,
        reservation_id: ReservationId,
        new_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE booths SET session_end = $2, updated_at = $3 \
             WHERE active_reservation_id = $1 AND state IN ('reserved', 'occupied')",
        )
        .bind(reservation_id)
        .bind(new_end)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to extend booth sessions"))?;
        Ok(result.rows_affected())
    }

    async fn occupy(&self, reservation_id: ReservationId, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE booths SET state = 'occupied', updated_at = $2 \
             WHERE active_reservation_id = $1 AND state = 'reserved'",
        )
        .bind(reservation_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to occupy booths"))?;
        Ok(result.rows_affected())
    }

    async fn set_state(
        &self,
        id: BoothId,
        state: BoothState,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        if !state.is_manual() {
            return Ok(false);
        }
        let result = sqlx::query(
            "UPDATE booths SET state = $2, updated_at = $3 \
             WHERE id = $1 AND state NOT IN ('reserved', 'occupied')",
        )
        .bind(id)
        .bind(state)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to set booth state"))?;
        Ok(result.rows_affected() == 1)
    }
}
