//! `sites` commands: list sites and reset their booths.

use clap::{Args, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use tabled::Tabled;

use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;
use lanhub_service::{RequestContext, SiteOverview};

use crate::output::{self, OutputFormat};

/// Arguments for the sites command
#[derive(Debug, Args)]
pub struct SitesArgs {
    /// Sites subcommand
    #[command(subcommand)]
    pub command: SitesCommand,
}

/// Sites subcommands
#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List active sites with free booth counts
    List,
    /// Recreate every booth of a site as free
    Reset {
        /// Site slug or id
        site: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct SiteRow {
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "District")]
    district: String,
    #[tabled(rename = "Free")]
    free: i64,
    #[tabled(rename = "Total")]
    total: i64,
    #[tabled(rename = "Open")]
    open: bool,
}

impl From<SiteOverview> for SiteRow {
    fn from(o: SiteOverview) -> Self {
        Self {
            slug: o.site.slug,
            name: o.site.name,
            district: o.site.address.district,
            free: o.booths.free,
            total: o.booths.total,
            open: o.is_open,
        }
    }
}

/// Execute a sites subcommand
pub async fn execute(
    args: &SitesArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;

    match &args.command {
        SitesCommand::List => {
            let rows: Vec<SiteRow> = services
                .catalog
                .list_sites()
                .await?
                .into_iter()
                .map(SiteRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        SitesCommand::Reset { site, force } => {
            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Free every booth of '{site}'?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Prompt failed: {e}")))?;
                if !confirmed {
                    output::print_warning("Aborted");
                    return Ok(());
                }
            }
            let booths = services
                .catalog
                .reset_site_booths(&RequestContext::system(), site)
                .await?;
            output::print_success(&format!("{} booths recreated at '{site}'", booths.len()));
        }
    }
    Ok(())
}
