//! Booth (cabina) entities.

pub mod model;
pub mod state;

pub use model::{Booth, BoothClaim, BoothSummary};
pub use state::BoothState;
