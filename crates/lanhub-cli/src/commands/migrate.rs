//! `migrate` command: apply SQL migrations.

use lanhub_core::config::{AppConfig, StoreProvider};
use lanhub_core::error::AppError;
use lanhub_database::DatabasePool;

use crate::output;

/// Execute the migrate command
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    if config.database.provider != StoreProvider::Postgres {
        return Err(AppError::configuration(
            "Migrations need database.provider = \"postgres\"",
        ));
    }

    let pool = DatabasePool::connect(&config.database).await?;
    let applied = pool.migrate().await;
    pool.close().await;
    applied?;

    output::print_success("Migrations applied");
    Ok(())
}
