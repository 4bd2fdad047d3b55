//! `sweep` command: close elapsed reservations once.

use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Execute the sweep command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;
    let report = services.sweeper.sweep(None).await?;
    output::print_report("Sweep finished", &report, format);
    Ok(())
}
