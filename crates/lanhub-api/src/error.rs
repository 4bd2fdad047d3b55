//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use lanhub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// An [`AppError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code and error code for an error kind.
    pub fn status_of(kind: ErrorKind) -> (StatusCode, &'static str) {
        match kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::InvalidPlan => (StatusCode::BAD_REQUEST, "INVALID_PLAN"),
            ErrorKind::BoothUnavailable => (StatusCode::BAD_REQUEST, "BOOTH_UNAVAILABLE"),
            ErrorKind::InsufficientPoints => (StatusCode::BAD_REQUEST, "INSUFFICIENT_POINTS"),
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code) = Self::status_of(err.kind);
        if status.is_server_error() {
            tracing::error!(
                kind = %err.kind,
                error = %err.message,
                source = ?err.source,
                "Internal server error"
            );
        }

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: err.message,
            details: err.details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_client_errors() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::InvalidPlan,
            ErrorKind::BoothUnavailable,
            ErrorKind::InsufficientPoints,
        ] {
            assert_eq!(ApiError::status_of(kind).0, StatusCode::BAD_REQUEST);
        }
        assert_eq!(
            ApiError::status_of(ErrorKind::Conflict).0,
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::status_of(ErrorKind::Database).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_details_reach_the_body() {
        let response = ApiError::from(AppError::booth_unavailable(&[3, 4], &[4])).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
