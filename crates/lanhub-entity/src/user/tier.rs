//! Loyalty tiers derived from the current point balance.

use serde::{Deserialize, Serialize};

/// Loyalty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// 0 to 49 points.
    Bronze,
    /// 50 to 199 points.
    Silver,
    /// 200 to 499 points.
    Gold,
    /// 500 to 999 points.
    Platinum,
    /// 1000 points and more.
    Diamond,
}

impl Tier {
    /// Lowest balance of the tier.
    pub fn min_points(&self) -> i64 {
        match self {
            Self::Bronze => 0,
            Self::Silver => 50,
            Self::Gold => 200,
            Self::Platinum => 500,
            Self::Diamond => 1000,
        }
    }

    /// Discount granted, in percent.
    pub fn discount_percent(&self) -> u8 {
        match self {
            Self::Bronze => 0,
            Self::Silver => 5,
            Self::Gold => 10,
            Self::Platinum => 15,
            Self::Diamond => 20,
        }
    }

    /// The tier above, if any.
    pub fn next(&self) -> Option<Tier> {
        match self {
            Self::Bronze => Some(Self::Silver),
            Self::Silver => Some(Self::Gold),
            Self::Gold => Some(Self::Platinum),
            Self::Platinum => Some(Self::Diamond),
            Self::Diamond => None,
        }
    }
}

/// A balance's tier and progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    /// Tier reached.
    pub tier: Tier,
    /// Discount granted, in percent.
    pub discount_percent: u8,
    /// Balance the tier was computed from.
    pub points: i64,
    /// Points missing to reach the next tier; `None` at the top.
    pub points_to_next: Option<i64>,
}

/// Tier for a point balance. Negative balances count as zero.
pub fn tier_for(points: i64) -> TierInfo {
    let points = points.max(0);
    let tier = [Tier::Diamond, Tier::Platinum, Tier::Gold, Tier::Silver]
        .into_iter()
        .find(|t| points >= t.min_points())
        .unwrap_or(Tier::Bronze);
    TierInfo {
        tier,
        discount_percent: tier.discount_percent(),
        points,
        points_to_next: tier.next().map(|next| next.min_points() - points),
    }
}
