//! # lanhub-service
//!
//! Business logic for LanHub. Each service orchestrates the stores, the
//! clock and the credential helpers to implement one area of the system.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod booth;
pub mod catalog;
pub mod context;
pub mod reservation;
pub mod rewards;
pub mod services;
pub mod sweeper;

#[cfg(test)]
mod testing;

pub use account::{AccountService, LoginRequest, LoginResponse, Profile, RegisterRequest};
pub use booth::{BoothListing, BoothService, BoothView, ReleaseReport};
pub use catalog::{
    CatalogService, PlanCatalog, PlanView, SeedReport, SiteDetail, SiteOverview,
};
pub use context::RequestContext;
pub use reservation::{CreateReservation, ReservationService};
pub use rewards::{RewardsService, RewardsSummary};
pub use services::Services;
pub use sweeper::{ClosedReservation, ExpirationSweeper, SweepReport};
