//! User, rewards account and usage statistics.

pub mod model;
pub mod rewards;
pub mod role;
pub mod stats;
pub mod tier;

pub use model::{CreateUser, User};
pub use rewards::RewardsAccount;
pub use role::UserRole;
pub use stats::{UserActivity, UserStats};
pub use tier::{Tier, TierInfo, tier_for};
