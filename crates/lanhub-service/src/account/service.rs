//! Account registration, login and profile.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use lanhub_auth::{JwtEncoder, PasswordHasher, PasswordValidator};
use lanhub_core::error::AppError;
use lanhub_core::traits::Clock;
use lanhub_core::types::UserId;
use lanhub_database::store::UserStore;
use lanhub_entity::user::{CreateUser, TierInfo, User, UserRole};

use crate::context::RequestContext;

/// Self-service registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Login name.
    #[validate(length(min = 3, max = 30, message = "Username must be 3 to 30 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Given name.
    #[validate(length(min = 1, max = 60, message = "First name is required"))]
    pub first_name: String,
    /// Family name.
    #[validate(length(min = 1, max = 60, message = "Last name is required"))]
    pub last_name: String,
}

/// Credentials for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Authenticated user.
    pub user_id: UserId,
    /// Their email.
    pub email: String,
    /// Their username.
    pub username: String,
    /// Their role.
    pub role: UserRole,
}

/// A user with their current tier.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// The user record.
    #[serde(flatten)]
    pub user: User,
    /// Tier derived from the point balance.
    pub tier: TierInfo,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            tier: user.rewards.tier(),
            user,
        }
    }
}

/// Registers users and issues tokens.
#[derive(Debug, Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            validator,
            encoder,
            clock,
        }
    }

    /// Create a customer account.
    pub async fn register(&self, req: RegisterRequest) -> Result<Profile, AppError> {
        req.validate()
            .map_err(|e| AppError::validation(format!("Invalid registration: {e}")))?;
        self.validator.validate(&req.password)?;

        if self.users.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Username '{}' is already taken",
                req.username
            )));
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let password_hash = self.hasher.hash_password(&req.password)?;
        let user = CreateUser {
            username: req.username.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            role: UserRole::Customer,
        }
        .into_user(self.clock.now());
        self.users.create(&user).await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user.into())
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::validation(format!("Invalid login: {e}")))?;

        let user = self
            .users
            .find_by_email(req.email.trim())
            .await?
            .ok_or_else(|| AppError::not_found("No account with that email"))?;
        if !self.hasher.verify_password(&req.password, &user.password_hash)? {
            return Err(AppError::authentication("Incorrect password"));
        }

        let now = self.clock.now();
        let issued = self.encoder.issue(user.id, user.role, &user.username, now)?;
        self.users.touch_login(user.id, now).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginResponse {
            token: issued.token,
            expires_at: issued.expires_at,
            user_id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
        })
    }

    /// The caller's profile.
    pub async fn me(&self, ctx: &RequestContext) -> Result<Profile, AppError> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .map(Profile::from)
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Give an existing account the administrator role.
    pub async fn promote(&self, ctx: &RequestContext, email: &str) -> Result<User, AppError> {
        ctx.require_admin()?;
        let mut user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No account with email {email}")))?;
        if !self.users.set_role(user.id, UserRole::Admin).await? {
            return Err(AppError::not_found(format!("No account with email {email}")));
        }
        user.role = UserRole::Admin;
        info!(user_id = %user.id, "User promoted to administrator");
        Ok(user)
    }
}
