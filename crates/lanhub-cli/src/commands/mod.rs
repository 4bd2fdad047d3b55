//! CLI command definitions and dispatch.

pub mod booths;
pub mod migrate;
pub mod seed;
pub mod serve;
pub mod sites;
pub mod sweep;
pub mod users;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use lanhub_core::config::{AppConfig, StoreProvider};
use lanhub_core::error::AppError;
use lanhub_core::traits::SystemClock;
use lanhub_database::Stores;
use lanhub_service::Services;

use crate::output::{self, OutputFormat};

/// LanHub: booth reservations for LAN centers
#[derive(Debug, Parser)]
#[command(name = "lanhub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Configuration environment (selects `<config-dir>/<env>.toml`)
    #[arg(short, long, env = "LANHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Apply database migrations
    Migrate,
    /// Create the reference sites and their booths
    Seed,
    /// Close elapsed reservations and free their booths
    Sweep,
    /// Site catalog
    Sites(sites::SitesArgs),
    /// Booth registry
    Booths(booths::BoothsArgs),
    /// User administration
    Users(users::UsersArgs),
}

impl Cli {
    /// Whether this invocation runs the server.
    pub fn is_serve(&self) -> bool {
        matches!(self.command, Commands::Serve(_))
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config_dir, &self.env)?;
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate => migrate::execute(&config).await,
            Commands::Seed => seed::execute(&config, self.format).await,
            Commands::Sweep => sweep::execute(&config, self.format).await,
            Commands::Sites(args) => sites::execute(args, &config, self.format).await,
            Commands::Booths(args) => booths::execute(args, &config, self.format).await,
            Commands::Users(args) => users::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect the configured stores and build the services over them
pub async fn connect_services(config: &AppConfig) -> Result<Services, AppError> {
    if config.database.provider == StoreProvider::Memory {
        output::print_warning("Using the in-memory store; changes are lost when this command exits.");
    }
    let stores = Stores::connect(&config.database).await?;
    Ok(Services::build(&stores, config, Arc::new(SystemClock)))
}
