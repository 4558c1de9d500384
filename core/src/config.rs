//! Client configuration: credential, endpoint and transport timeout.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Paid-tier endpoint.
pub const PRO_ENDPOINT: &str = "https://api.deepl.com/v2";
/// Free-tier endpoint.
pub const FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings needed to build a `Translator`.
///
/// Deserializable so it can be embedded in an application's own config
/// file; `from_env` covers the common environment-only setup.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    pub auth_key: String,
    /// Overrides the endpoint picked from the key.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(auth_key: impl Into<String>) -> Self {
        Self {
            auth_key: auth_key.into(),
            endpoint_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Reads `DEEPL_AUTH_KEY` (required), `DEEPL_ENDPOINT_URL` and
    /// `DEEPL_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let auth_key = lookup("DEEPL_AUTH_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingVar("DEEPL_AUTH_KEY"))?;

        let timeout_secs = match lookup("DEEPL_TIMEOUT_SECS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "DEEPL_TIMEOUT_SECS",
                value,
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            auth_key,
            endpoint_url: lookup("DEEPL_ENDPOINT_URL"),
            timeout_secs,
        })
    }

    /// The configured endpoint, or the tier matching the key.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        match &self.endpoint_url {
            Some(url) => parse_endpoint(url),
            None => parse_endpoint(default_endpoint_for(&self.auth_key)),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("auth_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Free-tier keys carry a `:fx` suffix.
pub fn default_endpoint_for(auth_key: &str) -> &'static str {
    if auth_key.ends_with(":fx") {
        FREE_ENDPOINT
    } else {
        PRO_ENDPOINT
    }
}

/// Parses and checks a base URL: http(s) and able to take path segments.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("url cannot be used as a base".to_string()));
    }
    Ok(url)
}
