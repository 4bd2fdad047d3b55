//! Site entity model.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lanhub_core::types::SiteId;

use super::hours::OpeningHours;

/// A physical location offering bookable booths.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Unique site identifier.
    pub id: SiteId,
    /// Human-readable unique identifier (e.g. `silicom-lan-center`).
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Short description shown to customers.
    pub description: String,
    /// Postal address.
    #[sqlx(flatten)]
    pub address: Address,
    /// Number of booths the site was seeded with.
    pub booth_count: i32,
    /// Opening hours per day class.
    #[sqlx(json)]
    pub hours: OpeningHours,
    /// Whether the site accepts bookings.
    pub active: bool,
    /// When the site was created.
    pub created_at: DateTime<Utc>,
    /// When the site was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Site {
    /// Whether the site is open at `at`, evaluated in the local `offset`.
    pub fn is_open_at(&self, at: DateTime<Utc>, offset: FixedOffset) -> bool {
        self.hours.is_open_at(at.with_timezone(&offset).naive_local())
    }
}

/// Postal address of a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street and number.
    pub street: String,
    /// District.
    pub district: String,
    /// City.
    pub city: String,
    /// Region.
    pub region: String,
    /// Free-form landmark reference.
    pub reference: String,
}

impl Address {
    /// Single-line rendering: street, district, city.
    pub fn full(&self) -> String {
        format!("{}, {}, {}", self.street, self.district, self.city)
    }
}

/// Data required to seed a new site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSite {
    /// Unique slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Address.
    pub address: Address,
    /// Number of booths to create.
    pub booth_count: i32,
    /// Opening hours.
    pub hours: OpeningHours,
}

impl CreateSite {
    /// Materialize into a new active [`Site`].
    pub fn into_site(self, now: DateTime<Utc>) -> Site {
        Site {
            id: SiteId::new(),
            slug: self.slug,
            name: self.name,
            description: self.description,
            address: self.address,
            booth_count: self.booth_count,
            hours: self.hours,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
