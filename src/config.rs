//! Client configuration
//!
//! A [`ClientConfig`] can be built in code or loaded from YAML:
//!
//! ```yaml
//! base_url: https://theseed.example/api
//! token: "my-api-token"
//! interval_seconds: 1.0
//! ```

use crate::auth::ApiToken;
use crate::error::{Error, Result};
use crate::http::RateLimiter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Interval NamuWiki asks bots to keep between requests
pub const RECOMMENDED_INTERVAL_SECONDS: f64 = 1.0;

/// Settings needed to open a [`TheSeedClient`](crate::http::TheSeedClient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, e.g. `https://theseed.example/api`
    pub base_url: String,

    /// API token sent as a bearer credential
    #[serde(default)]
    pub token: ApiToken,

    /// Minimum seconds between requests (0 disables limiting)
    #[serde(default)]
    pub interval_seconds: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: ApiToken::default(),
            interval_seconds: 0.0,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Check required values without opening a connection
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::invalid_value("base_url", "must not be empty"));
        }
        if self.token.is_empty() {
            return Err(Error::invalid_value("token", "must not be empty"));
        }
        if !self.interval_seconds.is_finite() {
            return Err(Error::invalid_value(
                "interval_seconds",
                "must be a finite number",
            ));
        }
        Ok(())
    }

    /// Rate limiter described by `interval_seconds`
    pub fn rate_limiter(&self) -> Result<RateLimiter> {
        RateLimiter::from_secs_f64(self.interval_seconds)
    }
}

/// Builder for [`ClientConfig`]
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API token
    pub fn token(mut self, token: impl Into<ApiToken>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Set the minimum interval between requests, in seconds
    pub fn interval_seconds(mut self, seconds: f64) -> Self {
        self.config.interval_seconds = seconds;
        self
    }

    /// Use the interval recommended for NamuWiki
    pub fn recommended_interval(self) -> Self {
        self.interval_seconds(RECOMMENDED_INTERVAL_SECONDS)
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
