//! Route handlers organized by domain.

pub mod auth;
pub mod booths;
pub mod health;
pub mod maintenance;
pub mod reservations;
pub mod rewards;
pub mod sites;
