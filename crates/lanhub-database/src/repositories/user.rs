//! User repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use lanhub_core::error::{AppError, ErrorKind};
use lanhub_core::result::AppResult;
use lanhub_core::types::UserId;
use lanhub_entity::user::{RewardsAccount, User, UserActivity, UserRole};

use super::insert_error;
use crate::store::UserStore;

/// Repository for users and their embedded rewards accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const REWARDS_COLUMNS: &str = "points_current, points_earned, points_redeemed";

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn create(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, role, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "User"))?;
        Ok(())
    }

    async fn credit(&self, id: UserId, amount: i64) -> AppResult<RewardsAccount> {
        if amount < 0 {
            return Err(AppError::validation("Credited points must not be negative"));
        }
        sqlx::query_as::<_, RewardsAccount>(&format!(
            "UPDATE users SET points_current = points_current + $2, \
             points_earned = points_earned + $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {REWARDS_COLUMNS}"
        ))
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to credit points", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn debit(&self, id: UserId, amount: i64) -> AppResult<Option<RewardsAccount>> {
        if amount <= 0 {
            return Err(AppError::validation("Redeemed points must be positive"));
        }
        sqlx::query_as::<_, RewardsAccount>(&format!(
            "UPDATE users SET points_current = points_current - $2, \
             points_redeemed = points_redeemed + $2, updated_at = NOW() \
             WHERE id = $1 AND points_current >= $2 RETURNING {REWARDS_COLUMNS}"
        ))
        .bind(id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to debit points", e))
    }

    async fn record_activity(&self, id: UserId, activity: UserActivity) -> AppResult<()> {
        let query = match activity {
            UserActivity::Booked { at } => sqlx::query(
                "UPDATE users SET total_reservations = total_reservations + 1, \
                 last_reservation_at = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(at),
            UserActivity::Completed { hours, spent } => sqlx::query(
                "UPDATE users SET completed_reservations = completed_reservations + 1, \
                 total_hours = total_hours + $2, money_spent = money_spent + $3, \
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(hours)
            .bind(spent),
            UserActivity::Cancelled => sqlx::query(
                "UPDATE users SET cancelled_reservations = cancelled_reservations + 1, \
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(id),
        };
        query.execute(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record user activity", e)
        })?;
        Ok(())
    }

    async fn touch_login(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record login", e)
            })?;
        Ok(())
    }

    async fn set_role(&self, id: UserId, role: UserRole) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set role", e))?;
        Ok(result.rows_affected() == 1)
    }
}
