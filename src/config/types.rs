//! Runtime settings types.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    /// Expected value of the `X-API-Key` header.
    pub api_key: String,
    /// Session cookies are encrypted with a key derived from this value.
    pub secret_key: String,
    pub session_ttl: Duration,
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Public URL of the frontend; CAS redirects back to `{service_url}/api/login?`.
    pub service_url: String,
    pub cas_server_url: String,
    pub cas_timeout: Duration,
    pub log_json: bool,
}

impl AppConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Allowed CORS origins for the current environment.
    pub fn cors_origins(&self) -> Vec<String> {
        if self.environment.is_development() {
            vec!["http://localhost:3000".to_string()]
        } else {
            vec![self.service_url.trim_end_matches('/').to_string(), "https://login.vt.edu".to_string()]
        }
    }
}
