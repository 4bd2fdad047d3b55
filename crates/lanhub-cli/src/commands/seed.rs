//! `seed` command: create the reference sites.

use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;
use lanhub_service::RequestContext;

use crate::output::{self, OutputFormat};

/// Execute the seed command
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;
    let report = services
        .catalog
        .seed_catalog(&RequestContext::system())
        .await?;

    if report.sites_created == 0 {
        output::print_warning("Catalog already seeded; nothing created");
    }
    output::print_report("Catalog seeded", &report, format);
    Ok(())
}
