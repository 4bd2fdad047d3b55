//! Request DTOs.

use serde::Deserialize;
use validator::Validate;

use lanhub_core::types::UserId;
use lanhub_entity::booth::BoothState;
use lanhub_entity::plan::PaymentMethod;
use lanhub_service::CreateReservation;

/// Body of `POST /reservations`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Book on behalf of another user (admins only).
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Site id or slug.
    #[serde(default)]
    pub site_id: Option<String>,
    /// Booth numbers within the site.
    #[validate(length(min = 1, message = "At least one booth is required"))]
    pub booth_numbers: Vec<i32>,
    /// Plan id.
    #[validate(length(min = 1, message = "Plan is required"))]
    pub plan_id: String,
    /// Payment method, Yape when absent.
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl From<CreateReservationRequest> for CreateReservation {
    fn from(req: CreateReservationRequest) -> Self {
        Self {
            user_id: req.user_id,
            site_id: req.site_id,
            booth_numbers: req.booth_numbers,
            plan_id: req.plan_id,
            payment_method: req.payment_method,
        }
    }
}

/// Body of `POST /reservations/{id}/extend`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtendRequest {
    /// Plan to add.
    #[validate(length(min = 1, message = "Plan is required"))]
    pub plan_id: String,
}

/// Body of `POST /reservations/{id}/cancel`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    /// Why the booking was cancelled.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Body of `POST /booths/release`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseBoothsRequest {
    /// Booth numbers to free.
    #[validate(length(min = 1, message = "At least one booth is required"))]
    pub booth_numbers: Vec<i32>,
    /// Site id or slug.
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Body of `PUT /booths/{id}/state`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetBoothStateRequest {
    /// Target state: free, maintenance or out_of_service.
    pub state: BoothState,
}

/// Body of `POST /rewards/redeem`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RedeemRequest {
    /// Points to spend.
    #[validate(range(min = 1, message = "Points must be positive"))]
    pub points: i64,
}

/// Query of `GET /booths`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoothQuery {
    /// Site id or slug.
    pub site_id: Option<String>,
}

/// Query of `GET /reservations`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationQuery {
    /// Whose reservations to list; the caller when absent.
    pub user_id: Option<UserId>,
}
