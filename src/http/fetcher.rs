//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests, including:
//! - Building HTTP clients with the browser-identifying user agent
//! - GET and form POST requests with an optional referer
//! - Error classification into [`FetchError`]

use crate::config::Config;
use crate::FetchError;
use reqwest::header::REFERER;
use reqwest::Client;

/// HTTP method of a [`FetchRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One request across the transport boundary
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    /// Previous hop, sent as `Referer`
    pub referer: Option<String>,
    /// URL-encoded form body (POST only)
    pub form: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            referer: None,
            form: Vec::new(),
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            referer: None,
            form,
        }
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The tool configuration (user agent and request timeout)
/// * `cookies` - Whether the client keeps a cookie jar across requests
///
/// # Example
///
/// ```no_run
/// use egydead_dl::config::Config;
/// use egydead_dl::http::build_http_client;
///
/// let client = build_http_client(&Config::default(), false).unwrap();
/// ```
pub fn build_http_client(config: &Config, cookies: bool) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.site.user_agent.clone())
        .timeout(config.timing.request_timeout())
        .connect_timeout(std::time::Duration::from_secs(10))
        .cookie_store(cookies)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the client used to stream media files to disk
///
/// Unlike [`build_http_client`] there is no total request timeout. Only
/// connecting is bounded here; the caller bounds the wait for each chunk.
pub fn build_download_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.site.user_agent.clone())
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
}

/// Thin wrapper over a [`Client`] implementing the transport boundary
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with its own client from configuration
    pub fn from_config(config: &Config, cookies: bool) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, cookies)?))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends a request and returns the body of a successful response
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - 2xx response with its body
    /// * `Err(FetchError::Status)` - Non-success status code
    /// * `Err(FetchError::Network)` - Connection, timeout or body read failure
    pub async fn fetch(&self, request: FetchRequest) -> Result<Page, FetchError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url).form(&request.form),
        };

        if let Some(referer) = &request.referer {
            builder = builder.header(REFERER, referer);
        }

        tracing::debug!("{:?} {}", request.method, request.url);

        let response = builder.send().await.map_err(|e| network_error(&request.url, e))?;
        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: request.url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| network_error(&request.url, e))?;

        Ok(Page {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }

    /// GET shorthand
    pub async fn get(&self, url: &str) -> Result<Page, FetchError> {
        self.fetch(FetchRequest::get(url)).await
    }
}

/// Classifies a reqwest error into a transport failure
fn network_error(url: &str, e: reqwest::Error) -> FetchError {
    let message = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };

    FetchError::Network {
        url: url.to_string(),
        message,
    }
}
