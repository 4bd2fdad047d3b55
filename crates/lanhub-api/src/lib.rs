//! # lanhub-api
//!
//! HTTP API layer for LanHub built on Axum.
//!
//! Provides the REST endpoints under `/api`, the bearer-token extractor,
//! request logging and CORS middleware, DTOs, and the mapping from
//! [`lanhub_core::AppError`] to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
