//! shortener-client — HTTP adapter for the remote key-value link shortener.
//!
//! Purpose
//! - Implements the `Shortener` port from the `domain` crate over HTTPS.
//! - Tags every destination URL with the fixed UTM parameters before sending.
//! - Captures remote 4xx/5xx as data (`response_status`) instead of errors;
//!   only failures to reach the service surface as `CoreError::Transport`.
//!
//! API
//! - `POST {base}/shorten {longUrl, customSlug?}`
//! - `POST {base}/remove {slug}`
//! - `POST {base}/track {slug}`
//!
//! Every request carries the `x-api-key` header.

use std::time::Duration;

use domain::tracking::tag_url;
use domain::{ActionResult, ActionType, CoreError, Shortener, Slug};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.aws3.link";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("invalid base url: {0}")]
    BadBaseUrl(String),
    #[error("http client setup failed: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to /{endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("reading /{endpoint} response failed: {source}")]
    Body {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl From<ClientError> for CoreError {
    fn from(e: ClientError) -> Self {
        CoreError::Transport(e.to_string())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShortenBody<'a> {
    long_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_slug: Option<&'a str>,
}

#[derive(Serialize)]
struct SlugBody<'a> {
    slug: &'a str,
}

/// Remote shortener reached over HTTP.
#[derive(Clone)]
pub struct HttpShortener {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpShortener {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::BadBaseUrl(base_url));
        }
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::MissingConfig("api key"));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { http, base_url, api_key })
    }

    /// Construct from `SHORTENER_API_KEY` (required) and `SHORTENER_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var("SHORTENER_API_KEY")
            .map_err(|_| ClientError::MissingConfig("SHORTENER_API_KEY"))?;
        let base_url = std::env::var("SHORTENER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body and return the status plus the decoded payload.
    /// A body that is not JSON comes back as a JSON string.
    async fn post<B: Serialize>(&self, endpoint: &'static str, body: &B) -> Result<(u16, Value), ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "shortener request");
        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport { endpoint, source })?;
        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|source| ClientError::Body { endpoint, source })?;
        let payload = serde_json::from_str(&text).unwrap_or(Value::String(text));
        if status == 200 {
            info!(endpoint, status, "shortener response");
        } else {
            warn!(endpoint, status, "shortener rejected request");
        }
        Ok((status, payload))
    }

    async fn call<B: Serialize>(&self, endpoint: &'static str, body: &B) -> Result<(u16, Value), CoreError> {
        self.post(endpoint, body).await.map_err(|e| {
            error!(endpoint, error = %e, "shortener unreachable");
            CoreError::from(e)
        })
    }
}

impl Shortener for HttpShortener {
    async fn shorten(&self, long_url: &str, key: Option<&Slug>) -> Result<ActionResult, CoreError> {
        let tagged = tag_url(long_url);
        let body = ShortenBody {
            long_url: &tagged,
            custom_slug: key.map(Slug::as_str),
        };
        let (status, payload) = self.call("shorten", &body).await?;
        Ok(ActionResult {
            action_type: ActionType::Create,
            url_key: key.cloned(),
            long_url: Some(tagged),
            response_payload: payload,
            response_status: status,
        })
    }

    async fn remove(&self, key: &Slug) -> Result<ActionResult, CoreError> {
        let (status, payload) = self.call("remove", &SlugBody { slug: key.as_str() }).await?;
        Ok(ActionResult {
            action_type: ActionType::Delete,
            url_key: Some(key.clone()),
            long_url: None,
            response_payload: payload,
            response_status: status,
        })
    }

    async fn track(&self, key: &Slug) -> Result<Value, CoreError> {
        let (_, payload) = self.call("track", &SlugBody { slug: key.as_str() }).await?;
        Ok(payload)
    }
}
