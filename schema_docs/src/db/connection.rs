//! Database connection handling
//!
//! This module establishes the PostgreSQL connection pool used by the
//! introspection queries.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Open a PostgreSQL connection pool from configuration
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool_size = config.pool_size.unwrap_or(5);
    let timeout_seconds = config.timeout_seconds.unwrap_or(30);

    let pool = PgPoolOptions::new()
        .max_connections(pool_size)
        .acquire_timeout(std::time::Duration::from_secs(timeout_seconds))
        .connect(&config.url)
        .await?;

    Ok(pool)
}
