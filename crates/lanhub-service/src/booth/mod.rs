//! Booth registry reads and administration.

pub mod service;

pub use service::{BoothListing, BoothService, BoothView, ReleaseReport};
