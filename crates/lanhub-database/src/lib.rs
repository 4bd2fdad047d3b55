//! # lanhub-database
//!
//! Persistence for LanHub. The [`store`] module defines one trait per
//! aggregate; [`repositories`] implements them on PostgreSQL and [`memory`]
//! implements all of them on a single process-local mutex.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{BoothStore, ClaimOutcome, ReservationStore, SiteStore, Stores, UserStore};
