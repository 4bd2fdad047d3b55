//! # lanhub-entity
//!
//! Domain entity models for LanHub. Every struct in this crate represents a
//! stored record or a domain value object. Booth, site and user entities
//! additionally derive `sqlx::FromRow`; reservations are mapped by the
//! database crate because of their nested sub-records.
//!
//! The state-changing methods here (claiming and releasing booths,
//! reservation transitions, point credits) are the single definition of the
//! lifecycle rules; store backends either call them directly or mirror them
//! in conditional SQL.

pub mod booth;
pub mod plan;
pub mod reservation;
pub mod site;
pub mod user;
