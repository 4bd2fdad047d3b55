//! `booths` commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;
use lanhub_service::BoothView;

use crate::output::{self, OutputFormat};

/// Arguments for the booths command
#[derive(Debug, Args)]
pub struct BoothsArgs {
    /// Booths subcommand
    #[command(subcommand)]
    pub command: BoothsCommand,
}

/// Booths subcommands
#[derive(Debug, Subcommand)]
pub enum BoothsCommand {
    /// List booths of a site
    List {
        /// Site slug or id; the default site when omitted
        #[arg(long)]
        site: Option<String>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct BoothRow {
    #[tabled(rename = "#")]
    number: i32,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Reservation")]
    reservation: String,
    #[tabled(rename = "Minutes left")]
    minutes_left: i64,
    #[tabled(rename = "Bookings")]
    total_reservations: i32,
}

impl From<BoothView> for BoothRow {
    fn from(v: BoothView) -> Self {
        Self {
            number: v.booth.number,
            state: v.booth.state.to_string(),
            reservation: v
                .booth
                .active_reservation_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            minutes_left: v.time_remaining,
            total_reservations: v.booth.total_reservations,
        }
    }
}

/// Execute a booths subcommand
pub async fn execute(
    args: &BoothsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = super::connect_services(config).await?;

    match &args.command {
        BoothsCommand::List { site } => {
            let listing = services.booths.list_booths(site.as_deref()).await?;
            let summary = listing.summary;
            let rows: Vec<BoothRow> = listing.booths.into_iter().map(BoothRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                output::print_kv("Free", &format!("{} of {}", summary.free, summary.total));
            }
        }
    }
    Ok(())
}
