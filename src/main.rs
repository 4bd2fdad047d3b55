//! LanHub Server: booth reservations for LAN centers.
//!
//! Loads configuration, initializes logging, connects the configured store
//! and serves the HTTP API until interrupted.

use tracing_subscriber::{EnvFilter, fmt};

use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;
use lanhub_database::Stores;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("LANHUB_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("LANHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        provider = ?config.database.provider,
        "Starting LanHub"
    );

    let stores = Stores::connect(&config.database).await?;
    tracing::info!("Store ready");

    lanhub_api::run_server(config, stores).await
}
