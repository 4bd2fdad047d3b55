//! Reservation ledger entities.

pub mod code;
pub mod model;
pub mod state;

pub use code::generate_code;
pub use model::{
    BoothRef, DurationInfo, Extension, NewReservation, Payment, Points, Price, Reservation,
    Schedule, SiteSnapshot, StateChange,
};
pub use state::ReservationState;
