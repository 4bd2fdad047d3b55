//! Reservation ledger: booking, extension, cancellation and check-in.

pub mod service;

pub use service::{CreateReservation, ReservationService};
