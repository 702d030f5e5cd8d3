// API client module: a small blocking HTTP client for the Crawlio API.
// Every public operation makes exactly one request and turns any failure
// into a `false`/`None` result after logging what went wrong, so callers
// only decide whether to carry on.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

/// Address used when neither `--base-url` nor `CRAWLIO_BASE_URL` is given.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3002";

/// Header carrying the API key on authenticated calls.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Why a request did not produce a usable response. These never leave the
/// public operations; they are logged and collapsed into a falsy result.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No API key available. Please register first.")]
    MissingApiKey,

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}. {details}")]
    Status { status: StatusCode, details: String },

    #[error("response body is not valid JSON: {0}")]
    Body(#[source] reqwest::Error),

    #[error("response has no `{0}` field")]
    MissingField(&'static str),
}

/// Account creation payload.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// What the remote service should extract from the page. Unset fields are
/// left out of the request so the server applies its own defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrawlOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_links: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_meta: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<bool>,
}

impl CrawlOptions {
    /// Text, links and metadata, no screenshot.
    pub fn full_page() -> Self {
        CrawlOptions {
            extract_text: Some(true),
            extract_links: Some(true),
            extract_meta: Some(true),
            screenshot: Some(false),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.extract_text.is_none()
            && self.extract_links.is_none()
            && self.extract_meta.is_none()
            && self.screenshot.is_none()
    }
}

#[derive(Serialize, Debug)]
struct CrawlRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a CrawlOptions>,
}

/// Blocking client holding the reqwest session, the base URL of the API
/// and the API key once one is known.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    /// Build a client for `base_url`. A trailing `/` is dropped so paths can
    /// be appended directly.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Use an API key obtained elsewhere, e.g. from an earlier registration.
    pub fn set_api_key(&mut self, api_key: &str) {
        self.api_key = Some(api_key.to_string());
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Create an account and keep the returned API key. Returns `false` when
    /// the request fails or the response carries no key; a key set earlier
    /// is kept in that case.
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> bool {
        let req = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        info!("Registering user: {}", email);
        match self.try_register(&req) {
            Ok(api_key) => {
                info!("Registration successful");
                self.api_key = Some(api_key);
                true
            }
            Err(e) => {
                error!("Registration failed: {}", e);
                false
            }
        }
    }

    /// Crawl `url` through the API. `options` are sent only when at least
    /// one of them is set. Returns the response document untouched.
    pub fn crawl(&self, url: &str, options: Option<&CrawlOptions>) -> Option<Value> {
        match self.try_crawl(url, options) {
            Ok(data) => {
                info!("Crawling completed successfully");
                Some(data)
            }
            Err(e) => {
                error!("Crawling failed: {}", e);
                None
            }
        }
    }

    /// Fetch the crawl jobs recorded for the current API key.
    pub fn fetch_history(&self) -> Option<Value> {
        match self.try_fetch_history() {
            Ok(data) => {
                info!("History retrieved successfully");
                Some(data)
            }
            Err(e) => {
                error!("Failed to get history: {}", e);
                None
            }
        }
    }

    /// Header map with the API key. Fails before any I/O when no key is set.
    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ApiError::MissingApiKey)?;
        let val = HeaderValue::from_str(key).map_err(|_| ApiError::InvalidApiKey)?;
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, val);
        Ok(headers)
    }

    fn try_register(&self, req: &RegisterRequest) -> Result<String, ApiError> {
        let url = format!("{}/api/auth/register", &self.base_url);
        let res = self.client.post(&url).json(req).send()?;
        let data = read_json(res)?;
        data.get("api_key")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .ok_or(ApiError::MissingField("api_key"))
    }

    fn try_crawl(&self, url: &str, options: Option<&CrawlOptions>) -> Result<Value, ApiError> {
        let headers = self.auth_headers()?;
        let api_url = format!("{}/api/crawl/url", &self.base_url);
        let body = CrawlRequest {
            url,
            options: options.filter(|o| !o.is_empty()),
        };
        info!("Crawling: {}", url);
        let res = self.client.post(&api_url).headers(headers).json(&body).send()?;
        read_json(res)
    }

    fn try_fetch_history(&self) -> Result<Value, ApiError> {
        let headers = self.auth_headers()?;
        let url = format!("{}/api/crawl/history", &self.base_url);
        info!("Fetching crawl history...");
        let res = self.client.get(&url).headers(headers).send()?;
        read_json(res)
    }
}

/// Parse a successful response as JSON, or turn a failure status into
/// [`ApiError::Status`] carrying whatever the server said about it.
fn read_json(res: Response) -> Result<Value, ApiError> {
    let status = res.status();
    debug!("{} {}", status, res.url());
    if !status.is_success() {
        let txt = res.text().unwrap_or_default();
        let details = match serde_json::from_str::<Value>(&txt) {
            Ok(payload) => format!("Error details: {}", payload),
            Err(_) => format!("Response: {}", txt),
        };
        return Err(ApiError::Status { status, details });
    }
    res.json().map_err(ApiError::Body)
}
