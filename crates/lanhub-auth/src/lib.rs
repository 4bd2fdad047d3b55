//! # lanhub-auth
//!
//! Credential handling for LanHub.
//!
//! ## Modules
//!
//! - `jwt`: signed bearer tokens carrying the user id and role
//! - `password`: Argon2id hashing and the registration password policy

pub mod jwt;
pub mod password;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
