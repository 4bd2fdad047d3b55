//! `serve` command: run the HTTP API.

use clap::Args;

use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;
use lanhub_database::Stores;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Host to bind to (overrides config)
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }

    let stores = Stores::connect(&config.database).await?;
    lanhub_api::run_server(config, stores).await
}
