//! Registration, login and profiles.

pub mod service;

pub use service::{AccountService, LoginRequest, LoginResponse, Profile, RegisterRequest};
