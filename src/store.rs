//! Database bootstrap: create the target database when missing and open the pool.

use crate::config::AppConfig;
use crate::error::{AppError, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_database_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url).map_err(|e| invalid_url(e.to_string()))?;
    let mut conn = opts.connect().await?;
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists {
        sqlx::query(&format!("CREATE DATABASE {}", crate::sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

/// Open the application pool sized from `DATABASE_MAX_CONNECTIONS`.
pub async fn connect(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;
    tracing::info!(max_connections = config.database_max_connections, "database pool ready");
    Ok(pool)
}

fn invalid_url(reason: String) -> AppError {
    AppError::Config(ConfigError::Invalid {
        key: "DATABASE_URL",
        reason,
    })
}

/// Returns `(admin_url, database_name)`; the admin URL points at `postgres` with the same query string.
fn split_database_url(url: &str) -> Result<(String, String), AppError> {
    let parsed = url::Url::parse(url).map_err(|e| invalid_url(e.to_string()))?;
    let db_name = parsed.path().trim_start_matches('/').to_string();
    let mut admin = parsed.clone();
    admin.set_path("/postgres");
    Ok((admin.to_string(), db_name))
}
