//! Common routes: health, readiness, version, and the public `/api` welcome.

use crate::response::{error_body, success_one_ok, ApiResult, Envelope};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

async fn health() -> ApiResult<Value> {
    Ok(success_one_ok(json!({ "status": "ok" })))
}

async fn ready(State(state): State<AppState>) -> Result<Json<Envelope<Value>>, (StatusCode, Json<Envelope<()>>)> {
    if let Err(e) = sqlx::query("SELECT 1").fetch_optional(&state.pool).await {
        tracing::warn!(error = %e, "readiness check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(error_body("Database unavailable".into())),
        ));
    }
    Ok(Json(Envelope::ok(json!({ "status": "ok", "database": "ok" }))))
}

async fn version() -> ApiResult<Value> {
    Ok(success_one_ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    })))
}

/// GET /api
async fn welcome(State(state): State<AppState>) -> ApiResult<Value> {
    let mode = state.config.environment.as_str();
    Ok(success_one_ok(json!({
        "message": format!("Roster backend v{} in {} mode", env!("CARGO_PKG_VERSION"), mode),
        "environment": mode,
    })))
}

/// GET /api/test
async fn smoke_test() -> ApiResult<Value> {
    Ok(success_one_ok(json!({ "message": "Test endpoint reachable" })))
}

/// GET /health, /ready (database ping), /version, /api, /api/test. None require the API key.
pub fn common_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/api", get(welcome))
        .route("/api/", get(welcome))
        .route("/api/test", get(smoke_test))
}
