//! CAS login, logout and the current-user endpoint. Not behind the API key.

use crate::auth::CasIdentity;
use crate::error::AppError;
use crate::extractors::{CurrentSession, QueryMap};
use crate::model::USERS;
use crate::response::{success_one_ok, ApiResult};
use crate::service::{CrudService, RequestValidator};
use crate::sql::PgBindValue;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::{json, Map, Value};

const DEFAULT_ROLE: &str = "student";

/// GET /api/login?ticket=&role=
pub async fn login(
    State(state): State<AppState>,
    session: CurrentSession,
    query: QueryMap,
) -> Result<Response, AppError> {
    if state.config.environment.is_development() {
        let role = query.get("role").unwrap_or(DEFAULT_ROLE);
        let user = CrudService::find_by_ignore_case(&state.pool, &USERS, "edupersonprimaryaffiliation", role)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dev user '{}' not found in database", role)))?;
        let username = user["username"].as_str().unwrap_or_default().to_string();
        tracing::info!(%username, role, "mock login");
        let body = success_one_ok(json!({ "message": "Mock login successful", "user": user }));
        return Ok((session.start(&username), body).into_response());
    }

    if let Some(username) = &session.username {
        return Ok(success_one_ok(json!({ "message": "Logged in!", "username": username })).into_response());
    }

    let Some(ticket) = query.get("ticket").filter(|t| !t.is_empty()) else {
        let login_url = state.cas.login_url();
        tracing::info!(%login_url, "returning CAS redirect URL");
        return Ok(success_one_ok(json!({
            "redirect_url": login_url,
            "message": "Redirect to CAS login"
        }))
        .into_response());
    };

    let identity = state
        .cas
        .validate(ticket)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid CAS ticket".into()))?;
    ensure_user(&state, &identity).await?;
    tracing::info!(username = %identity.user, "CAS login");
    Ok((session.start(&identity.user), Redirect::to(&state.config.service_url)).into_response())
}

/// Create the user on first CAS login.
/// A conflict only counts as success when the username now exists (a concurrent first login won the insert);
/// any other unique clash, such as a uupid owned by another user, is a 409.
async fn ensure_user(state: &AppState, identity: &CasIdentity) -> Result<(), AppError> {
    if user_exists(state, &identity.user).await? {
        tracing::info!(username = %identity.user, "existing user logged in");
        return Ok(());
    }
    let body = new_user_body(identity);
    let values = RequestValidator::validate(&USERS, &body)?;
    match CrudService::create(&state.pool, &USERS, &values).await {
        Ok(row) => {
            tracing::info!(id = %row["id"], username = %identity.user, "created user from CAS");
            Ok(())
        }
        Err(AppError::Conflict(msg)) => {
            if user_exists(state, &identity.user).await? {
                tracing::warn!(username = %identity.user, %msg, "user already created");
                return Ok(());
            }
            tracing::warn!(username = %identity.user, %msg, "CAS user clashes with another user");
            Err(AppError::Conflict(msg))
        }
        Err(e) => Err(e),
    }
}

async fn user_exists(state: &AppState, username: &str) -> Result<bool, AppError> {
    let row = CrudService::find_by(&state.pool, &USERS, "username", PgBindValue::text(username)).await?;
    Ok(row.is_some())
}

fn new_user_body(identity: &CasIdentity) -> Map<String, Value> {
    let user = identity.user.as_str();
    let mut body = Map::new();
    body.insert("username".into(), json!(user));
    body.insert(
        "edupersonprimaryaffiliation".into(),
        json!(identity.attribute("eduPersonPrimaryAffiliation").unwrap_or(DEFAULT_ROLE)),
    );
    body.insert("uupid".into(), json!(identity.attribute("uid").unwrap_or(user)));
    body.insert(
        "edupersonprincipalname".into(),
        json!(identity
            .attribute("eduPersonPrincipalName")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}@vt.edu", user))),
    );
    body
}

/// GET /api/logout
/// Ends the local session and expires the cookie. Outside development the client must still visit CAS logout.
pub async fn logout(State(state): State<AppState>, session: CurrentSession) -> Response {
    tracing::info!(username = ?session.username, "logout");
    let data = if state.config.environment.is_development() {
        json!({ "message": "Mock logout successful", "user": session.username })
    } else {
        json!({ "redirect_url": state.cas.logout_url(), "message": "Redirect to CAS logout" })
    };
    (session.end(), success_one_ok(data)).into_response()
}

/// GET /api/me
pub async fn me(State(state): State<AppState>, session: CurrentSession) -> ApiResult<Value> {
    let username = session
        .username
        .ok_or_else(|| AppError::Unauthorized("Not logged in".into()))?;
    let user = CrudService::find_by(&state.pool, &USERS, "username", PgBindValue::text(username))
        .await?
        .ok_or_else(|| USERS.not_found())?;
    Ok(success_one_ok(user))
}
