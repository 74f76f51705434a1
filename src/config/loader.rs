//! Load settings from the process environment (after `.env` has been read by the binary).

use crate::config::types::{AppConfig, Environment};
use crate::config::validate;
use crate::error::ConfigError;
use std::time::Duration;

pub const DEFAULT_SERVICE_URL: &str = "https://webgeek.discovery.cs.vt.edu";
pub const DEFAULT_CAS_SERVER_URL: &str = "https://login.vt.edu/profile/cas/";

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let api_key = get("API_KEY").ok_or(ConfigError::Missing("API_KEY"))?;
        let secret_key = get("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;

        let environment = match get("ENVIRONMENT").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("production") => Environment::Production,
            Some("development") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "ENVIRONMENT",
                    reason: format!("expected development or production, got {}", other),
                })
            }
        };

        let config = AppConfig {
            database_url,
            database_max_connections: parse_or(get("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 5)?,
            api_key,
            secret_key,
            session_ttl: Duration::from_secs(parse_or(get("SESSION_TTL_SECS"), "SESSION_TTL_SECS", 7200)?),
            environment,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(get("APP_PORT"), "APP_PORT", 8000)?,
            service_url: get("SERVICE_URL").unwrap_or_else(|| DEFAULT_SERVICE_URL.into()),
            cas_server_url: get("CAS_SERVER_URL").unwrap_or_else(|| DEFAULT_CAS_SERVER_URL.into()),
            cas_timeout: Duration::from_secs(parse_or(get("CAS_TIMEOUT_SECS"), "CAS_TIMEOUT_SECS", 10)?),
            log_json: get("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")).unwrap_or(false),
        };
        validate(&config)?;
        Ok(config)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("{}: {}", v, e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/roster"),
        ("API_KEY", "secret"),
        ("SECRET_KEY", "0123456789abcdef0123456789abcdef"),
    ];

    #[test]
    fn defaults() {
        let cfg = load(&BASE).unwrap();
        assert_eq!(cfg.environment, Environment::Production);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
        assert_eq!(cfg.database_max_connections, 5);
        assert_eq!(cfg.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(cfg.cas_server_url, DEFAULT_CAS_SERVER_URL);
        assert_eq!(cfg.cas_timeout, Duration::from_secs(10));
        assert!(!cfg.log_json);
        assert_eq!(cfg.session_ttl, Duration::from_secs(7200));
    }

    #[test]
    fn missing_api_key() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/roster"), ("API_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_KEY")));
    }

    #[test]
    fn secret_key_is_required_and_long_enough() {
        let err = load(&BASE[..2]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SECRET_KEY")));

        let mut pairs = BASE[..2].to_vec();
        pairs.push(("SECRET_KEY", "short"));
        assert!(matches!(load(&pairs).unwrap_err(), ConfigError::Invalid { key: "SECRET_KEY", .. }));
    }

    #[test]
    fn overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("ENVIRONMENT", "Development"),
            ("APP_PORT", "9001"),
            ("LOG_FORMAT", "json"),
            ("SERVICE_URL", "http://localhost:3000"),
        ]);
        let cfg = load(&pairs).unwrap();
        assert!(cfg.environment.is_development());
        assert_eq!(cfg.port, 9001);
        assert!(cfg.log_json);
        assert_eq!(cfg.cors_origins(), vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn bad_values() {
        let mut pairs = BASE.to_vec();
        pairs.push(("APP_PORT", "eighty"));
        assert!(matches!(load(&pairs).unwrap_err(), ConfigError::Invalid { key: "APP_PORT", .. }));

        let mut pairs = BASE.to_vec();
        pairs.push(("ENVIRONMENT", "staging"));
        assert!(matches!(load(&pairs).unwrap_err(), ConfigError::Invalid { key: "ENVIRONMENT", .. }));
    }
}
