//! PostgreSQL connection pool.
//!
//! # Design Decisions
//! - The pool is created lazily: no connection is opened until first use, so
//!   boot does not block on the database being reachable
//! - The `postgres` section is re-validated here before any pool exists
//! - Only the shutdown path closes the pool

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use thiserror::Error;

use crate::config::validation::{validate_postgres, ValidationErrors};
use crate::config::PostgresConfig;

/// Time allowed to acquire a connection from the pool.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid postgres config: {0}")]
    InvalidConfig(#[from] ValidationErrors),
}

/// Connection options for the configured database.
fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
}

/// Validate the section and create the pool.
///
/// Must be called from within a Tokio runtime.
pub fn create_pool(config: &PostgresConfig) -> Result<PgPool, PoolError> {
    validate_postgres(config)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(connect_options(config));

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lazy_pool_opens_no_connections() {
        let pool = create_pool(&PostgresConfig::default()).unwrap();
        assert_eq!(pool.size(), 0);
        assert!(!pool.is_closed());

        pool.close().await;
        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn invalid_section_creates_no_pool() {
        let config = PostgresConfig {
            database: String::new(),
            ..PostgresConfig::default()
        };
        let err = create_pool(&config).unwrap_err();
        assert!(err.to_string().contains("postgres.database"));
    }
}
