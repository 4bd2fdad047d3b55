//! Site (cybercafé) catalog entities.

pub mod hours;
pub mod model;

pub use hours::{DayClass, DayHours, OpeningHours};
pub use model::{Address, CreateSite, Site};
