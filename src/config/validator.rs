//! Settings validation: URLs must parse, the pool must have at least one connection,
//! the session secret must be long enough to derive a cookie key from.

use crate::config::AppConfig;
use crate::error::ConfigError;
use url::Url;

/// Shortest `SECRET_KEY` accepted for cookie key derivation, in bytes.
pub const MIN_SECRET_KEY_LEN: usize = 32;

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let db = Url::parse(&config.database_url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        reason: e.to_string(),
    })?;
    if !matches!(db.scheme(), "postgres" | "postgresql") {
        return Err(ConfigError::Invalid {
            key: "DATABASE_URL",
            reason: format!("unsupported scheme {}", db.scheme()),
        });
    }

    for (key, value) in [("SERVICE_URL", &config.service_url), ("CAS_SERVER_URL", &config.cas_server_url)] {
        let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key,
                reason: "must be an http(s) URL".into(),
            });
        }
    }

    if config.secret_key.len() < MIN_SECRET_KEY_LEN {
        return Err(ConfigError::Invalid {
            key: "SECRET_KEY",
            reason: format!("must be at least {} bytes", MIN_SECRET_KEY_LEN),
        });
    }

    if config.session_ttl.is_zero() {
        return Err(ConfigError::Invalid {
            key: "SESSION_TTL_SECS",
            reason: "must be at least 1".into(),
        });
    }

    if config.database_max_connections == 0 {
        return Err(ConfigError::Invalid {
            key: "DATABASE_MAX_CONNECTIONS",
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use std::time::Duration;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://u:p@localhost:5432/roster".into(),
            database_max_connections: 5,
            api_key: "k".into(),
            secret_key: "0123456789abcdef0123456789abcdef".into(),
            session_ttl: Duration::from_secs(7200),
            environment: Environment::Production,
            host: "127.0.0.1".into(),
            port: 8000,
            service_url: "https://webgeek.discovery.cs.vt.edu".into(),
            cas_server_url: "https://login.vt.edu/profile/cas/".into(),
            cas_timeout: Duration::from_secs(10),
            log_json: false,
        }
    }

    #[test]
    fn accepts_valid_config() {
        assert!(validate(&config()).is_ok());
    }

    #[test]
    fn rejects_non_postgres_database() {
        let mut cfg = config();
        cfg.database_url = "mysql://localhost/roster".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid { key: "DATABASE_URL", .. })));
    }

    #[test]
    fn rejects_bad_cas_url() {
        let mut cfg = config();
        cfg.cas_server_url = "login.vt.edu".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid { key: "CAS_SERVER_URL", .. })));
    }

    #[test]
    fn rejects_short_secret_and_zero_ttl() {
        let mut cfg = config();
        cfg.secret_key = "x".repeat(MIN_SECRET_KEY_LEN - 1);
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid { key: "SECRET_KEY", .. })));

        let mut cfg = config();
        cfg.session_ttl = Duration::ZERO;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid { key: "SESSION_TTL_SECS", .. })));
    }

    #[test]
    fn rejects_empty_pool() {
        let mut cfg = config();
        cfg.database_max_connections = 0;
        assert!(validate(&cfg).is_err());
    }
}
