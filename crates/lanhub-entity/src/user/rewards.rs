//! Embedded rewards account.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lanhub_core::{AppError, AppResult};

use super::tier::{TierInfo, tier_for};

/// Point balance of a user. `points_current = points_earned - points_redeemed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RewardsAccount {
    /// Spendable balance.
    pub points_current: i64,
    /// Lifetime points earned.
    pub points_earned: i64,
    /// Lifetime points redeemed.
    pub points_redeemed: i64,
}

impl RewardsAccount {
    /// Add earned points.
    pub fn credit(&mut self, amount: i64) -> AppResult<()> {
        if amount < 0 {
            return Err(AppError::validation("Credited points must not be negative"));
        }
        self.points_current += amount;
        self.points_earned += amount;
        Ok(())
    }

    /// Spend points, refusing to go below zero.
    pub fn debit(&mut self, amount: i64) -> AppResult<()> {
        if amount <= 0 {
            return Err(AppError::validation("Redeemed points must be positive"));
        }
        if amount > self.points_current {
            return Err(AppError::insufficient_points(amount, self.points_current));
        }
        self.points_current -= amount;
        self.points_redeemed += amount;
        Ok(())
    }

    /// Current tier.
    pub fn tier(&self) -> TierInfo {
        tier_for(self.points_current)
    }

    /// Whether the balance agrees with the lifetime counters.
    pub fn is_balanced(&self) -> bool {
        self.points_current >= 0
            && self.points_current == self.points_earned - self.points_redeemed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanhub_core::ErrorKind;

    #[test]
    fn test_credit_then_debit() {
        let mut account = RewardsAccount::default();
        account.credit(12).expect("credit");
        account.debit(5).expect("debit");
        assert_eq!(account.points_current, 7);
        assert_eq!(account.points_earned, 12);
        assert_eq!(account.points_redeemed, 5);
        assert!(account.is_balanced());
    }

    #[test]
    fn test_overdraft_rejected() {
        let mut account = RewardsAccount::default();
        account.credit(3).expect("credit");
        let err = account.debit(4).expect_err("overdraft");
        assert_eq!(err.kind, ErrorKind::InsufficientPoints);
        assert_eq!(account.points_current, 3);
        assert!(account.is_balanced());
    }
}
