//! Loyalty points: balances, tiers and redemption.

pub mod service;

pub use service::{RewardsService, RewardsSummary};
