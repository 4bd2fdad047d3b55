//! Rewards account operations.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use lanhub_core::error::AppError;
use lanhub_core::types::UserId;
use lanhub_database::store::UserStore;
use lanhub_entity::user::{RewardsAccount, TierInfo};

use crate::context::RequestContext;

/// A user's balance together with the tier it earns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsSummary {
    /// Point counters.
    pub account: RewardsAccount,
    /// Tier derived from the current balance.
    pub tier: TierInfo,
}

impl From<RewardsAccount> for RewardsSummary {
    fn from(account: RewardsAccount) -> Self {
        Self {
            tier: account.tier(),
            account,
        }
    }
}

/// Credits, debits and reports loyalty points.
#[derive(Debug, Clone)]
pub struct RewardsService {
    users: Arc<dyn UserStore>,
}

impl RewardsService {
    /// Creates a new rewards service.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Add earned points to a user's balance.
    pub async fn credit(
        &self,
        user_id: UserId,
        amount: i64,
        reason: &str,
    ) -> Result<RewardsAccount, AppError> {
        if amount < 0 {
            return Err(AppError::validation("Credited points must not be negative"));
        }
        let account = self.users.credit(user_id, amount).await?;
        info!(
            user_id = %user_id,
            amount,
            balance = account.points_current,
            reason,
            "Points credited"
        );
        Ok(account)
    }

    /// Spend points from the caller's balance.
    ///
    /// Fails with `InsufficientPoints` and leaves the balance untouched when
    /// it is lower than `amount`.
    pub async fn redeem(
        &self,
        ctx: &RequestContext,
        amount: i64,
    ) -> Result<RewardsSummary, AppError> {
        if amount <= 0 {
            return Err(AppError::validation("Redeemed points must be positive"));
        }
        match self.users.debit(ctx.user_id, amount).await? {
            Some(account) => {
                info!(
                    user_id = %ctx.user_id,
                    amount,
                    balance = account.points_current,
                    "Points redeemed"
                );
                Ok(account.into())
            }
            None => {
                let available = self.account(ctx.user_id).await?.points_current;
                Err(AppError::insufficient_points(amount, available))
            }
        }
    }

    /// The caller's balance and tier.
    pub async fn summary(&self, ctx: &RequestContext) -> Result<RewardsSummary, AppError> {
        Ok(self.account(ctx.user_id).await?.into())
    }

    async fn account(&self, user_id: UserId) -> Result<RewardsAccount, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| u.rewards)
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use lanhub_core::ErrorKind;
    use lanhub_database::Stores;
    use lanhub_entity::user::{CreateUser, Tier, UserRole};

    use super::*;

    async fn setup() -> (RewardsService, RequestContext) {
        let stores = Stores::memory();
        let user = CreateUser {
            username: "gamer".to_string(),
            email: "gamer@example.com".to_string(),
            password_hash: "x".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Quispe".to_string(),
            role: UserRole::Customer,
        }
        .into_user(Utc::now());
        stores.users.create(&user).await.unwrap();
        let ctx = RequestContext::new(user.id, user.role, user.username.clone());
        (RewardsService::new(stores.users), ctx)
    }

    #[tokio::test]
    async fn test_credit_then_redeem() {
        let (service, ctx) = setup().await;
        service.credit(ctx.user_id, 120, "booking").await.unwrap();

        let summary = service.redeem(&ctx, 20).await.unwrap();
        assert_eq!(summary.account.points_current, 100);
        assert_eq!(summary.account.points_earned, 120);
        assert_eq!(summary.account.points_redeemed, 20);
        assert_eq!(summary.tier.tier, Tier::Silver);
    }

    #[tokio::test]
    async fn test_redeem_over_balance_leaves_account_untouched() {
        let (service, ctx) = setup().await;
        service.credit(ctx.user_id, 5, "booking").await.unwrap();

        let err = service.redeem(&ctx, 6).await.unwrap_err();
        assert!(err.is(ErrorKind::InsufficientPoints));

        let summary = service.summary(&ctx).await.unwrap();
        assert_eq!(summary.account.points_current, 5);
        assert_eq!(summary.account.points_redeemed, 0);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_redeem() {
        let (service, ctx) = setup().await;
        let err = service.redeem(&ctx, 0).await.unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }
}
