//! PostgreSQL pool and schema migrations.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use lanhub_core::config::DatabaseConfig;
use lanhub_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Shared PostgreSQL pool behind the repositories.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %redact_credentials(&config.url),
            max_connections = config.max_connections,
            "Opening PostgreSQL pool"
        );
        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| db_error("Cannot reach the reservation database", e))?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled migrations that the database has not seen yet.
    pub async fn migrate(&self) -> Result<(), AppError> {
        let bundled = MIGRATOR.iter().count();
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| db_error("Schema migration failed", e))?;
        info!(bundled, "Schema is up to date");
        Ok(())
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| db_error("Database ping failed", e))
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

fn db_error(context: &str, e: impl std::error::Error + Send + Sync + 'static) -> AppError {
    let message = format!("{context}: {e}");
    AppError::with_source(ErrorKind::Database, message, e)
}

/// Hide the user and password of a connection URL.
pub fn redact_credentials(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };
    let Some((_, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match scheme {
        Some(scheme) => format!("{scheme}://****@{host}"),
        None => format!("****@{host}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_credentials() {
        assert_eq!(
            redact_credentials("postgres://lanhub:secret@db:5432/lanhub"),
            "postgres://****@db:5432/lanhub"
        );
        assert_eq!(
            redact_credentials("postgres://lanhub@db/lanhub"),
            "postgres://****@db/lanhub"
        );
        assert_eq!(
            redact_credentials("postgres://localhost:5432/lanhub"),
            "postgres://localhost:5432/lanhub"
        );
    }

    #[test]
    fn test_pool_options_follow_config() {
        let config = DatabaseConfig::default();
        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), config.max_connections);
        assert_eq!(options.get_min_connections(), config.min_connections);
    }
}
