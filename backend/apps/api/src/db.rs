//! Database bootstrap

use anyhow::Context;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::ApiConfig;

/// Connect with a bounded number of attempts and a fixed backoff
///
/// Only startup retries. Once the pool exists, query failures surface to the
/// caller unchanged.
pub async fn connect_with_retry(config: &ApiConfig) -> anyhow::Result<PgPool> {
    let options = PgPoolOptions::new().max_connections(config.db_max_connections);
    let mut attempt = 1;

    loop {
        match options.clone().connect(&config.database_url).await {
            Ok(pool) => {
                tracing::info!(attempt, "Connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < config.db_connect_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = config.db_connect_attempts,
                    backoff_secs = config.db_connect_backoff.as_secs(),
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(config.db_connect_backoff).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("could not connect to database after {attempt} attempts")
                });
            }
        }
    }
}
