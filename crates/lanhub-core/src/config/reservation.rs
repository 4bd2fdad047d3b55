//! Booking rules and defaults.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Reservation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfig {
    /// Site used when a booking request does not name one.
    #[serde(default = "default_site_slug")]
    pub default_site_slug: String,
    /// Offset from UTC, in minutes, of the local time the opening hours
    /// are expressed in. Defaults to Peru (UTC-05:00).
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// Maximum number of reservations returned by a user listing.
    #[serde(default = "default_listing_limit")]
    pub user_listing_limit: u32,
}

impl ReservationConfig {
    /// Fixed offset for opening-hours evaluation.
    ///
    /// Out-of-range values fall back to UTC.
    pub fn local_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            default_site_slug: default_site_slug(),
            utc_offset_minutes: default_utc_offset(),
            user_listing_limit: default_listing_limit(),
        }
    }
}

fn default_site_slug() -> String {
    "silicom-lan-center".to_string()
}

fn default_utc_offset() -> i32 {
    -5 * 60
}

fn default_listing_limit() -> u32 {
    50
}
