//! Response DTOs.

use serde::{Deserialize, Serialize};

use lanhub_service::SweepReport;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Whether the store answered.
    pub store: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
}

/// Result of a maintenance sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    /// Booths returned to free.
    pub released: u64,
    /// Reservations moved to a terminal state.
    pub reservations_closed: u64,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            released: report.booths_released,
            reservations_closed: report.reservations_closed,
        }
    }
}
