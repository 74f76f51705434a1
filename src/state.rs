//! Shared application state for all routes.

use crate::auth::{cookie_key, TicketValidator};
use crate::config::AppConfig;
use crate::error::ConfigError;
use axum_extra::extract::cookie::Key;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    /// Seals the session cookie.
    pub cookie_key: Key,
    /// CAS in production, a fake in tests.
    pub cas: Arc<dyn TicketValidator>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, cas: Arc<dyn TicketValidator>) -> Result<Self, ConfigError> {
        let cookie_key = cookie_key(&config.secret_key)?;
        Ok(AppState {
            pool,
            config: Arc::new(config),
            cookie_key,
            cas,
        })
    }
}
