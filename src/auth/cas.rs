//! CAS 2.0 ticket validation (`serviceValidate`) and login/logout URL construction.

use crate::config::AppConfig;
use crate::error::AppError;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use url::Url;

/// Identity asserted by the CAS server for a valid ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CasIdentity {
    pub user: String,
    pub attributes: HashMap<String, String>,
}

impl CasIdentity {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str).filter(|v| !v.is_empty())
    }
}

/// Identity provider seam. The server uses [`CasClient`]; tests inject a fake.
#[async_trait]
pub trait TicketValidator: Send + Sync {
    fn login_url(&self) -> String;

    fn logout_url(&self) -> String;

    /// `Ok(None)` when the CAS server rejects the ticket; `Err` when it cannot be reached or read.
    async fn validate(&self, ticket: &str) -> Result<Option<CasIdentity>, AppError>;
}

pub struct CasClient {
    http: reqwest::Client,
    server_url: Url,
    /// Callback URL registered with CAS. Must be byte-identical between login and validation.
    service: String,
    logout_redirect: String,
    parser: ServiceResponseParser,
}

impl CasClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let mut base = config.cas_server_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let server_url = Url::parse(&base).map_err(|e| AppError::Upstream(format!("invalid CAS URL: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(config.cas_timeout)
            .build()
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        let service_root = config.service_url.trim_end_matches('/');
        Ok(CasClient {
            http,
            server_url,
            service: format!("{}/api/login?", service_root),
            logout_redirect: service_root.to_string(),
            parser: ServiceResponseParser::new().map_err(|e| AppError::Upstream(e.to_string()))?,
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> String {
        match self.server_url.join(path) {
            Ok(mut url) => {
                url.query_pairs_mut().extend_pairs(query);
                url.into()
            }
            Err(_) => self.server_url.to_string(),
        }
    }
}

#[async_trait]
impl TicketValidator for CasClient {
    fn login_url(&self) -> String {
        self.endpoint("login", &[("service", self.service.as_str())])
    }

    fn logout_url(&self) -> String {
        self.endpoint("logout", &[("service", self.logout_redirect.as_str())])
    }

    async fn validate(&self, ticket: &str) -> Result<Option<CasIdentity>, AppError> {
        let url = self.endpoint("serviceValidate", &[("service", self.service.as_str()), ("ticket", ticket)]);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        if !res.status().is_success() {
            return Err(AppError::Upstream(format!("serviceValidate returned {}", res.status())));
        }
        let body = res.text().await.map_err(|e| AppError::Upstream(e.to_string()))?;
        let identity = self.parser.parse(&body);
        if identity.is_none() {
            tracing::warn!("CAS rejected ticket");
        }
        Ok(identity)
    }
}

/// Extracts the user and attributes from a `cas:serviceResponse` document.
pub struct ServiceResponseParser {
    user: Regex,
    attributes: Regex,
    attribute: Regex,
}

impl ServiceResponseParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(ServiceResponseParser {
            user: Regex::new(r"(?s)<cas:authenticationSuccess>.*?<cas:user>\s*([^<]*?)\s*</cas:user>")?,
            attributes: Regex::new(r"(?s)<cas:attributes>(.*?)</cas:attributes>")?,
            attribute: Regex::new(r"<cas:([A-Za-z0-9_.\-]+)>([^<]*)</cas:([A-Za-z0-9_.\-]+)>")?,
        })
    }

    /// `None` for an authentication failure or anything without a user.
    pub fn parse(&self, xml: &str) -> Option<CasIdentity> {
        let user = self.user.captures(xml)?.get(1)?.as_str();
        if user.is_empty() {
            return None;
        }
        let mut attributes = HashMap::new();
        if let Some(block) = self.attributes.captures(xml).and_then(|c| c.get(1)) {
            for cap in self.attribute.captures_iter(block.as_str()) {
                if cap[1] == cap[3] {
                    attributes
                        .entry(cap[1].to_string())
                        .or_insert_with(|| unescape(cap[2].trim()));
                }
            }
        }
        Some(CasIdentity {
            user: unescape(user),
            attributes,
        })
    }
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use std::time::Duration;

    const SUCCESS: &str = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
    <cas:authenticationSuccess>
        <cas:user>jdoe</cas:user>
        <cas:attributes>
            <cas:uid>123456789</cas:uid>
            <cas:eduPersonPrimaryAffiliation>faculty</cas:eduPersonPrimaryAffiliation>
            <cas:eduPersonPrincipalName>jdoe@vt.edu</cas:eduPersonPrincipalName>
            <cas:displayName>J &amp; Doe</cas:displayName>
        </cas:attributes>
    </cas:authenticationSuccess>
</cas:serviceResponse>"#;

    const FAILURE: &str = r#"<cas:serviceResponse xmlns:cas="http://www.yale.edu/tp/cas">
    <cas:authenticationFailure code="INVALID_TICKET">Ticket ST-1 not recognized</cas:authenticationFailure>
</cas:serviceResponse>"#;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/roster".into(),
            database_max_connections: 1,
            api_key: "k".into(),
            secret_key: "0123456789abcdef0123456789abcdef".into(),
            session_ttl: Duration::from_secs(7200),
            environment: Environment::Production,
            host: "127.0.0.1".into(),
            port: 8000,
            service_url: "https://webgeek.discovery.cs.vt.edu/".into(),
            cas_server_url: "https://login.vt.edu/profile/cas".into(),
            cas_timeout: Duration::from_secs(1),
            log_json: false,
        }
    }

    #[test]
    fn parses_user_and_attributes() {
        let id = ServiceResponseParser::new().unwrap().parse(SUCCESS).unwrap();
        assert_eq!(id.user, "jdoe");
        assert_eq!(id.attribute("uid"), Some("123456789"));
        assert_eq!(id.attribute("eduPersonPrimaryAffiliation"), Some("faculty"));
        assert_eq!(id.attribute("displayName"), Some("J & Doe"));
        assert_eq!(id.attribute("missing"), None);
    }

    #[test]
    fn failure_yields_none() {
        assert!(ServiceResponseParser::new().unwrap().parse(FAILURE).is_none());
        assert!(ServiceResponseParser::new().unwrap().parse("not xml").is_none());
    }

    #[test]
    fn success_without_attributes() {
        let xml = "<cas:serviceResponse><cas:authenticationSuccess><cas:user>abc</cas:user></cas:authenticationSuccess></cas:serviceResponse>";
        let id = ServiceResponseParser::new().unwrap().parse(xml).unwrap();
        assert_eq!(id.user, "abc");
        assert!(id.attributes.is_empty());
    }

    #[test]
    fn urls_point_at_cas_endpoints() {
        let client = CasClient::new(&config()).unwrap();
        assert_eq!(
            client.login_url(),
            "https://login.vt.edu/profile/cas/login?service=https%3A%2F%2Fwebgeek.discovery.cs.vt.edu%2Fapi%2Flogin%3F"
        );
        assert_eq!(
            client.logout_url(),
            "https://login.vt.edu/profile/cas/logout?service=https%3A%2F%2Fwebgeek.discovery.cs.vt.edu"
        );
    }
}
