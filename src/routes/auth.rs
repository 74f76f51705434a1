//! Session routes. Not behind the API key.

use crate::handlers::auth::{login, logout, me};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", get(login))
        .route("/api/logout", get(logout))
        .route("/api/me", get(me))
}
