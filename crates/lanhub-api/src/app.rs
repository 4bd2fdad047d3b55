//! Application builder: wires router, middleware and state into an Axum app.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use lanhub_auth::JwtDecoder;
use lanhub_core::config::AppConfig;
use lanhub_core::error::AppError;
use lanhub_core::traits::{Clock, SystemClock};
use lanhub_database::Stores;
use lanhub_service::Services;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the shared state: every service over `stores`, reading time from `clock`.
pub fn build_state(config: AppConfig, stores: Stores, clock: Arc<dyn Clock>) -> AppState {
    let services = Services::build(&stores, &config, clock);
    AppState {
        jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
        config: Arc::new(config),
        stores,
        started_at: Instant::now(),
        accounts: services.accounts,
        catalog: services.catalog,
        booths: services.booths,
        reservations: services.reservations,
        rewards: services.rewards,
        sweeper: services.sweeper,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Runs the LanHub server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig, stores: Stores) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config, stores, Arc::new(SystemClock));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "LanHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("LanHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
