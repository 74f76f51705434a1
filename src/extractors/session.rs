//! Current login session from the encrypted session cookie.

use crate::auth::{claims_from, removal_cookie, session_cookie, SessionClaims, SESSION_COOKIE};
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::PrivateCookieJar;
use chrono::Utc;
use std::time::Duration;

/// Username of a live session, `None` when the cookie is absent, tampered with or expired.
/// Holds the request's cookie jar so handlers can start or end the session in the response.
pub struct CurrentSession {
    pub username: Option<String>,
    jar: PrivateCookieJar,
    ttl: Duration,
    cross_site: bool,
}

impl CurrentSession {
    /// Jar that sets a fresh session cookie for `username`.
    pub fn start(self, username: &str) -> PrivateCookieJar {
        let claims = SessionClaims::new(username, self.ttl, Utc::now());
        self.jar.add(session_cookie(&claims, self.ttl, self.cross_site))
    }

    /// Jar that expires the session cookie, if the request carried one.
    pub fn end(self) -> PrivateCookieJar {
        self.jar.remove(removal_cookie())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        let username = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| claims_from(&cookie, Utc::now()))
            .map(|claims| claims.username);
        Ok(CurrentSession {
            username,
            jar,
            ttl: state.config.session_ttl,
            cross_site: !state.config.environment.is_development(),
        })
    }
}
