//! Router assembly.

mod auth;
mod common;
mod entity;

pub use auth::auth_routes;
pub use common::common_routes;
pub use entity::{entity_routes, resource_routes};

use crate::error::AppError;
use crate::extractors::{require_api_key, API_KEY_HEADER};
use crate::handlers::populate::populate;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::post,
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

async fn not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

/// The full application: API-key-gated business routes, auth, common routes, CORS and a body limit.
pub fn app(state: AppState) -> Router {
    let gated = entity_routes()
        .route("/api/populate", post(populate))
        .route("/api/populate/", post(populate))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let cors = cors_layer(&state.config.cors_origins());

    Router::new()
        .merge(gated)
        .merge(auth_routes())
        .merge(common_routes())
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, API_KEY_HEADER])
}
