//! Login sessions carried in an encrypted `roster_session` cookie. The server keeps no session state:
//! the cookie holds the username and an expiry, sealed with a key derived from `SECRET_KEY`.

use crate::config::MIN_SECRET_KEY_LEN;
use crate::error::ConfigError;
use axum_extra::extract::cookie::{Cookie, Key, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SESSION_COOKIE: &str = "roster_session";

/// Derive the cookie encryption key. Short secrets are rejected here rather than panicking in `Key::derive_from`.
pub fn cookie_key(secret: &str) -> Result<Key, ConfigError> {
    if secret.len() < MIN_SECRET_KEY_LEN {
        return Err(ConfigError::Invalid {
            key: "SECRET_KEY",
            reason: format!("must be at least {} bytes", MIN_SECRET_KEY_LEN),
        });
    }
    Ok(Key::derive_from(secret.as_bytes()))
}

/// What the session cookie stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub username: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl SessionClaims {
    pub fn new(username: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        SessionClaims {
            username: username.to_string(),
            expires_at: now.timestamp().saturating_add(ttl),
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.expires_at
    }
}

/// Plain session cookie for `claims`; the private jar encrypts the value when it is added.
/// Cross-site frontends need `SameSite=None; Secure`.
pub fn session_cookie(claims: &SessionClaims, ttl: Duration, cross_site: bool) -> Cookie<'static> {
    let value = serde_json::to_string(claims).unwrap_or_default();
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(cross_site)
        .same_site(if cross_site { SameSite::None } else { SameSite::Lax })
        .max_age(time::Duration::try_from(ttl).unwrap_or(time::Duration::MAX))
        .build()
}

/// Cookie to hand to `PrivateCookieJar::remove`; name and path must match the one that was set.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Claims from an already decrypted cookie, `None` when malformed or expired.
pub fn claims_from(cookie: &Cookie<'_>, now: DateTime<Utc>) -> Option<SessionClaims> {
    serde_json::from_str::<SessionClaims>(cookie.value())
        .ok()
        .filter(|claims| claims.is_live(now))
}
