//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use lanhub_core::config::AuthConfig;
use lanhub_core::error::AppError;

use super::claims::Claims;

/// Validates bearer tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use lanhub_core::ErrorKind;
    use lanhub_core::config::AuthConfig;
    use lanhub_core::types::UserId;
    use lanhub_entity::user::UserRole;

    use super::*;
    use crate::jwt::JwtEncoder;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_issue_and_decode() {
        let cfg = config("test-secret");
        let user_id = UserId::new();
        let now = Utc::now();
        let issued = JwtEncoder::new(&cfg)
            .issue(user_id, UserRole::Admin, "admin", now)
            .expect("issue");
        assert_eq!(issued.expires_at, now + Duration::hours(3));

        let claims = JwtDecoder::new(&cfg).decode(&issued.token).expect("decode");
        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.username, "admin");
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let issued = JwtEncoder::new(&config("one"))
            .issue(UserId::new(), UserRole::Customer, "u1", Utc::now())
            .expect("issue");
        let err = JwtDecoder::new(&config("two"))
            .decode(&issued.token)
            .expect_err("wrong secret");
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_rejects_expired_token() {
        let issued = JwtEncoder::new(&config("s"))
            .issue(
                UserId::new(),
                UserRole::Customer,
                "u1",
                Utc::now() - Duration::hours(4),
            )
            .expect("issue");
        let err = JwtDecoder::new(&config("s"))
            .decode(&issued.token)
            .expect_err("expired");
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
