//! `X-API-Key` gate for business routes.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};

/// `X-API-Key`; header names are matched case-insensitively.
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Middleware: reject with 401 unless the header equals the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(&API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);
    if provided != Some(state.config.api_key.as_str()) {
        tracing::warn!(
            path = %req.uri().path(),
            present = provided.is_some(),
            "api key rejected"
        );
        return Err(AppError::Unauthorized("Invalid or missing API Key".into()));
    }
    Ok(next.run(req).await)
}
