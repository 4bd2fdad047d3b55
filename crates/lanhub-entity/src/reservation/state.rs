//! Reservation lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a reservation.
///
/// `Pending -> Confirmed -> Active -> {Completed, Cancelled, Expired}`, with
/// `Active -> Extended -> Active` recorded on every extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "reservation_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    /// Created, awaiting payment.
    Pending,
    /// Paid, session not started.
    Confirmed,
    /// Session in progress.
    Active,
    /// Session ran to its end.
    Completed,
    /// Cancelled before the end.
    Cancelled,
    /// Lapsed without being used.
    Expired,
    /// Transient marker written when time is added.
    Extended,
}

impl ReservationState {
    /// States that never change again.
    pub const TERMINAL: [ReservationState; 3] = [Self::Completed, Self::Cancelled, Self::Expired];

    /// Whether the state is final.
    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    /// Whether the reservation may move from `self` to `next`.
    pub fn can_transition_to(&self, next: ReservationState) -> bool {
        use ReservationState::*;
        matches!(
            (self, next),
            (Pending, Confirmed | Cancelled | Expired)
                | (Confirmed, Active | Cancelled | Expired)
                | (Active, Extended | Completed | Cancelled | Expired)
                | (Extended, Active | Completed | Cancelled | Expired)
        )
    }

    /// Terminal state a reservation takes when its window lapses.
    ///
    /// Sessions that started finish as `Completed`; bookings that never
    /// reached `Active` become `Expired`.
    pub fn lapse_target(&self) -> ReservationState {
        match self {
            Self::Active | Self::Extended => Self::Completed,
            _ => Self::Expired,
        }
    }

    /// Return the state as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Extended => "extended",
        }
    }
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReservationState {
    type Err = lanhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            "extended" => Ok(Self::Extended),
            _ => Err(lanhub_core::AppError::validation(format!(
                "Invalid reservation state: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in ReservationState::TERMINAL {
            for next in [
                ReservationState::Pending,
                ReservationState::Active,
                ReservationState::Completed,
                ReservationState::Extended,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_lapse_target() {
        assert_eq!(
            ReservationState::Active.lapse_target(),
            ReservationState::Completed
        );
        assert_eq!(
            ReservationState::Confirmed.lapse_target(),
            ReservationState::Expired
        );
        assert_eq!(
            ReservationState::Pending.lapse_target(),
            ReservationState::Expired
        );
    }

    #[test]
    fn test_extension_round_trip_only_from_active() {
        assert!(ReservationState::Active.can_transition_to(ReservationState::Extended));
        assert!(ReservationState::Extended.can_transition_to(ReservationState::Active));
        assert!(!ReservationState::Confirmed.can_transition_to(ReservationState::Extended));
        assert!(!ReservationState::Extended.can_transition_to(ReservationState::Extended));
    }
}
