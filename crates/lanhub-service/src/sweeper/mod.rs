//! Lazy expiration of elapsed reservations and booth sessions.

pub mod service;

pub use service::{ClosedReservation, ExpirationSweeper, SweepReport};
