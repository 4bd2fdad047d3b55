//! Core type definitions used across the LanHub workspace.

pub mod id;

pub use id::*;
