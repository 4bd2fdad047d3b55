//! # lanhub-core
//!
//! Core crate for LanHub. Contains configuration schemas, typed
//! identifiers, the clock abstraction, and the unified error system.
//!
//! This crate has **no** internal dependencies on other LanHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
