//! Per-user usage statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Usage counters maintained by the reservation ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Reservations booked.
    pub total_reservations: i32,
    /// Reservations that ran to completion.
    pub completed_reservations: i32,
    /// Reservations cancelled.
    pub cancelled_reservations: i32,
    /// Hours of completed sessions.
    pub total_hours: f64,
    /// Money spent on completed sessions.
    pub money_spent: i64,
    /// When the user last booked.
    pub last_reservation_at: Option<DateTime<Utc>>,
}

/// A ledger event that updates [`UserStats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserActivity {
    /// A reservation was booked.
    Booked {
        /// Booking time.
        at: DateTime<Utc>,
    },
    /// A reservation completed.
    Completed {
        /// Hours booked, extensions included.
        hours: f64,
        /// Money charged, extensions included.
        spent: i64,
    },
    /// A reservation was cancelled.
    Cancelled,
}

impl UserStats {
    /// Fold an activity into the counters.
    pub fn apply(&mut self, activity: UserActivity) {
        match activity {
            UserActivity::Booked { at } => {
                self.total_reservations += 1;
                self.last_reservation_at = Some(at);
            }
            UserActivity::Completed { hours, spent } => {
                self.completed_reservations += 1;
                self.total_hours += hours;
                self.money_spent += spent;
            }
            UserActivity::Cancelled => self.cancelled_reservations += 1,
        }
    }
}
