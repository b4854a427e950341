//! Postgres pool construction and schema migrations.
//!
//! Handlers acquire one pooled connection per request; it goes back to the
//! pool when dropped, whichever way the handler returns.

use std::str::FromStr;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::DatabaseConfig;

/// Migrations embedded from `migrations/` at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the connection pool.
///
/// `pool_size` connections are kept open; up to `max_overflow` more are opened
/// under load. Beyond that ceiling callers wait up to `acquire_timeout`.
/// Every checkout is pinged first so broken connections are replaced.
/// Connections are made with the configured TLS mode (`require` by default).
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    pool_options(config)
        .connect_with(connect_options(config)?)
        .await
}

fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    Ok(PgConnectOptions::from_str(&config.url)?.ssl_mode(config.ssl_mode))
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    let max_connections = (config.pool_size + config.max_overflow).max(1);

    // Connections are only retired when a ping fails.
    PgPoolOptions::new()
        .min_connections(config.pool_size.min(max_connections))
        .max_connections(max_connections)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(true)
        .idle_timeout(None)
        .max_lifetime(None)
}

/// Applies every pending migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
