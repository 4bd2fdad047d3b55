//! Booth occupancy state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Occupancy state of a booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booth_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BoothState {
    /// Available for booking.
    Free,
    /// Held by a reservation, customer not yet seated.
    Reserved,
    /// Held by a reservation with the customer checked in.
    Occupied,
    /// Taken out of rotation for maintenance.
    Maintenance,
    /// Not usable.
    OutOfService,
}

impl BoothState {
    /// Whether the booth is held by a reservation.
    pub fn is_held(&self) -> bool {
        matches!(self, Self::Reserved | Self::Occupied)
    }

    /// Whether an administrator may put a booth into this state directly.
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Free | Self::Maintenance | Self::OutOfService)
    }

    /// Return the state as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Reserved => "reserved",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
            Self::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for BoothState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BoothState {
    type Err = lanhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "reserved" => Ok(Self::Reserved),
            "occupied" => Ok(Self::Occupied),
            "maintenance" => Ok(Self::Maintenance),
            "out_of_service" => Ok(Self::OutOfService),
            _ => Err(lanhub_core::AppError::validation(format!(
                "Invalid booth state: '{s}'. Expected one of: free, reserved, occupied, maintenance, out_of_service"
            ))),
        }
    }
}
