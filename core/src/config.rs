//! Client configuration.

use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for one Events Force client account.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Account slug; part of the default base URL.
    pub client_slug: String,
    pub api_key: String,
    /// Overrides the URL derived from `client_slug`, e.g. to point at a mock.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(client_slug: &str, api_key: &str) -> Self {
        ClientConfig {
            client_slug: client_slug.to_string(),
            api_key: api_key.to_string(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    /// Read `EVENTSFORCE_CLIENT_SLUG` and `EVENTSFORCE_API_KEY` (required),
    /// plus `EVENTSFORCE_BASE_URL` and `EVENTSFORCE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        ClientConfig::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::Config(format!("{name} is not set")))
        };
        let client_slug = required("EVENTSFORCE_CLIENT_SLUG")?;
        let api_key = required("EVENTSFORCE_API_KEY")?;
        let base_url = lookup("EVENTSFORCE_BASE_URL").filter(|v| !v.is_empty());
        let timeout_secs = match lookup("EVENTSFORCE_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                ApiError::Config(format!("EVENTSFORCE_TIMEOUT_SECS must be a whole number, got {raw:?}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        Ok(ClientConfig {
            client_slug,
            api_key,
            base_url,
            timeout_secs,
        })
    }

    /// Base URL without a trailing slash.
    pub fn resolved_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://www.eventsforce.net/{}/api/v2", self.client_slug),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ApiError> {
        if self.base_url.is_none() && self.client_slug.trim().is_empty() {
            return Err(ApiError::Config("client slug must not be empty".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(ApiError::Config("api key must not be empty".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_slug", &self.client_slug)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
