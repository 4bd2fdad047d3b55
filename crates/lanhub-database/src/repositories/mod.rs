//! PostgreSQL implementations of the store traits.

pub mod booth;
pub mod reservation;
pub mod site;
pub mod user;

pub use booth::BoothRepository;
pub use reservation::ReservationRepository;
pub use site::SiteRepository;
pub use user::UserRepository;

use lanhub_core::error::{AppError, ErrorKind};

/// Map an insert failure, turning unique violations into `Conflict`.
fn insert_error(err: sqlx::Error, what: &str) -> AppError {
    let unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if unique {
        AppError::with_source(ErrorKind::Conflict, format!("{what} already exists"), err)
    } else {
        AppError::with_source(ErrorKind::Database, format!("Failed to insert {what}"), err)
    }
}
