//! Site catalog and plan listing.

pub mod seed;
pub mod service;

pub use service::{CatalogService, PlanCatalog, PlanView, SeedReport, SiteDetail, SiteOverview};
