pub mod queries;

use crate::config::DatabaseConfig;
use crate::shared::AppResult;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Create the Postgres connection pool from settings.
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.url)
        .await?;
    Ok(pool)
}
