//! Convenience result type alias for LanHub.

use crate::error::AppError;

/// A specialized `Result` type for LanHub operations.
pub type AppResult<T> = Result<T, AppError>;
