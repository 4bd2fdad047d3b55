//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lanhub_core::AppError;
use lanhub_core::types::UserId;
use lanhub_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the API extractor from the bearer token and passed into
/// service methods so every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Role at the time the token was issued.
    pub role: UserRole,
    /// The username from the token.
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, role: UserRole, username: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            username: username.into(),
            request_time: Utc::now(),
        }
    }

    /// Context for operator commands run outside HTTP, with admin rights.
    pub fn system() -> Self {
        Self::new(UserId::from_uuid(uuid::Uuid::nil()), UserRole::Admin, "system")
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Fails with `Authorization` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Administrator role required"))
        }
    }

    /// Fails with `Authorization` unless the caller is `owner` or an admin.
    pub fn require_self_or_admin(&self, owner: UserId) -> Result<(), AppError> {
        if self.user_id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Cannot act on another user's reservations",
            ))
        }
    }
}
