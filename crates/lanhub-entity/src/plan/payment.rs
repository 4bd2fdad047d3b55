//! Payment methods.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a reservation is paid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Yape mobile wallet.
    #[default]
    Yape,
    /// Plin mobile wallet.
    Plin,
    /// Cash at the counter.
    Cash,
    /// Debit or credit card.
    Card,
    /// Redeemed reward points.
    Points,
}

impl PaymentMethod {
    /// Methods advertised alongside the plan list.
    pub const ADVERTISED: [PaymentMethod; 3] = [Self::Yape, Self::Plin, Self::Cash];

    /// Return the method as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yape => "yape",
            Self::Plin => "plin",
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Points => "points",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = lanhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yape" => Ok(Self::Yape),
            "plin" => Ok(Self::Plin),
            "cash" | "efectivo" => Ok(Self::Cash),
            "card" | "tarjeta" => Ok(Self::Card),
            "points" | "puntos" => Ok(Self::Points),
            _ => Err(lanhub_core::AppError::validation(format!(
                "Invalid payment method: '{s}'. Expected one of: yape, plin, cash, card, points"
            ))),
        }
    }
}
