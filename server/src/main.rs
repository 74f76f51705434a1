//! Roster server. Reads `.env`, prepares the database and serves the API.
//!
//! Run from repo root: `cargo run -p roster-server`

use roster_backend::{
    app, connect, ensure_database_exists, ensure_tables, init_tracing, AppConfig, AppState, CasClient,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);
    tracing::info!(environment = config.environment.as_str(), "starting roster server");

    ensure_database_exists(&config.database_url).await?;
    let pool = connect(&config).await?;
    ensure_tables(&pool).await?;

    let cas = CasClient::new(&config)?;
    let addr = config.bind_addr();
    let state = AppState::new(pool, config, Arc::new(cas))?;
    let router = app(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
