use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use medcap_core::Config;

/// Build the Postgres pool from configuration.
pub async fn connect_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
}
