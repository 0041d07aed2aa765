//! Typed TheSeed API client
//!
//! Every operation:
//! - waits on the rate limiter once
//! - makes exactly one HTTP call
//! - fails with `Error::HttpStatus` on a non-2xx answer, before parsing
//! - validates the body against the operation's schema

use super::rate_limit::RateLimiter;
use crate::auth::ApiToken;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::schema::{
    self, BacklinkResult, DiscussionThread, EditFetchResult, EditSubmitRequest, EditSubmitResult,
    SchemaValidationError,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};
use url::Url;

/// User agent of the underlying transport
pub const TRANSPORT_USER_AGENT: &str = "reqwest/0.12";

/// User agent sent with every request
pub fn user_agent() -> String {
    format!("{TRANSPORT_USER_AGENT} {}/{}", crate::NAME, crate::VERSION)
}

// ============================================================================
// Backlink query
// ============================================================================

/// Optional filters for [`TheSeedClient::get_backlinks`]
///
/// Only the parameters that are set are sent. `from` and `until` are
/// forwarded as given, even together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BacklinkQuery {
    /// Namespace of the linking documents
    pub namespace: Option<String>,
    /// Link kind bits (see [`BacklinkFlag`](crate::types::BacklinkFlag))
    pub flag: Option<u32>,
    /// Start listing from this document (inclusive)
    pub from: Option<String>,
    /// List up to this document (inclusive)
    pub until: Option<String>,
}

impl BacklinkQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn flag(mut self, flag: impl Into<u32>) -> Self {
        self.flag = Some(flag.into());
        self
    }

    #[must_use]
    pub fn from_document(mut self, document: impl Into<String>) -> Self {
        self.from = Some(document.into());
        self
    }

    #[must_use]
    pub fn until_document(mut self, document: impl Into<String>) -> Self {
        self.until = Some(document.into());
        self
    }

    /// Query pairs for the parameters that are set
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(namespace) = &self.namespace {
            params.push(("namespace", namespace.clone()));
        }
        if let Some(flag) = self.flag {
            params.push(("flag", flag.to_string()));
        }
        if let Some(from) = &self.from {
            params.push(("from", from.clone()));
        }
        if let Some(until) = &self.until {
            params.push(("until", until.clone()));
        }
        params
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for one TheSeed API session
///
/// Owns a pooled connection set that is released by [`close`](Self::close)
/// or when the client is dropped. Calls may run concurrently from shared
/// references; the limiter serializes their start times.
pub struct TheSeedClient {
    client: Client,
    base_url: String,
    url: Url,
    limiter: RateLimiter,
    user_agent: String,
}

impl TheSeedClient {
    /// Create a client without rate limiting
    pub fn new(base_url: &str, token: impl Into<ApiToken>) -> Result<Self> {
        Self::with_limiter(base_url, token, RateLimiter::disabled())
    }

    /// Create a client gated by `limiter`
    pub fn with_limiter(
        base_url: &str,
        token: impl Into<ApiToken>,
        limiter: RateLimiter,
    ) -> Result<Self> {
        let (base_url, url) = normalize_base_url(base_url)?;
        let token = token.into();
        let user_agent = user_agent();

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token.bearer_header()?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(&user_agent)
            .build()?;

        debug!(
            base_url = %base_url,
            interval_ms = limiter.interval().as_millis() as u64,
            "TheSeed client created"
        );

        Ok(Self {
            client,
            base_url,
            url,
            limiter,
            user_agent,
        })
    }

    /// Create a client from a validated config
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        Self::with_limiter(
            &config.base_url,
            config.token.clone(),
            config.rate_limiter()?,
        )
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Fetch a document's source and an edit token
    pub async fn fetch_for_edit(&self, document: &str) -> Result<EditFetchResult> {
        let url = self.endpoint("edit", document)?;
        let body = self.send("edit_get", self.client.get(url)).await?;
        validated("edit_get", schema::parse(&body))
    }

    /// Save a new revision of a document
    pub async fn submit_edit(
        &self,
        document: &str,
        request: &EditSubmitRequest,
    ) -> Result<EditSubmitResult> {
        let url = self.endpoint("edit", document)?;
        let body = self
            .send("edit_post", self.client.post(url).json(request))
            .await?;
        validated("edit_post", schema::parse(&body))
    }

    /// List documents linking to a document
    pub async fn get_backlinks(
        &self,
        document: &str,
        query: &BacklinkQuery,
    ) -> Result<BacklinkResult> {
        let url = self.endpoint("backlink", document)?;
        let params = query.params();

        let mut req = self.client.get(url);
        if !params.is_empty() {
            req = req.query(&params);
        }

        let body = self.send("backlink", req).await?;
        validated("backlink", schema::parse(&body))
    }

    /// List discussion threads of a document
    pub async fn get_discussions(&self, document: &str) -> Result<Vec<DiscussionThread>> {
        let url = self.endpoint("discuss", document)?;
        let body = self.send("discuss", self.client.get(url)).await?;
        validated("discuss", schema::parse_list(&body))
    }

    /// Release the connection pool
    pub fn close(self) {
        debug!(base_url = %self.base_url, "TheSeed client closed");
    }

    /// `{base}/{endpoint}/{document}`; `/` in the title separates sub-documents
    ///
    /// `.` and `..` segments are rejected: the URL serializer would resolve
    /// them and address a different document.
    fn endpoint(&self, endpoint: &str, document: &str) -> Result<Url> {
        if document.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(Error::InvalidDocument {
                document: document.to_string(),
            });
        }

        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl {
                url: self.base_url.clone(),
            })?
            .pop_if_empty()
            .push(endpoint)
            .extend(document.split('/'));
        Ok(url)
    }

    async fn send(&self, operation: &'static str, req: RequestBuilder) -> Result<String> {
        self.limiter.acquire().await;

        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(operation, status = status.as_u16(), "TheSeed API returned an error status");
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!(
            operation,
            status = status.as_u16(),
            bytes = body.len(),
            "TheSeed API call succeeded"
        );
        Ok(body)
    }
}

impl std::fmt::Debug for TheSeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TheSeedClient")
            .field("base_url", &self.base_url)
            .field("limiter", &self.limiter)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

fn validated<T>(
    operation: &'static str,
    result: std::result::Result<T, SchemaValidationError>,
) -> Result<T> {
    result.map_err(|e| {
        warn!(operation, fields = ?e.fields(), "TheSeed API response failed validation");
        Error::from(e)
    })
}

/// Strip trailing slashes and check the URL can take path segments
fn normalize_base_url(base_url: &str) -> Result<(String, Url)> {
    let trimmed = base_url.trim().trim_end_matches('/').to_string();
    let url = Url::parse(&trimmed)?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidBaseUrl { url: trimmed });
    }
    Ok((trimmed, url))
}
