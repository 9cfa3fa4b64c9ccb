//! reqwest-backed HTTP transport.

use std::time::Duration;

use async_trait::async_trait;

use codepage_core::config::StoreConfig;
use codepage_core::error::{AppError, ErrorKind};
use codepage_core::result::AppResult;
use codepage_core::traits::transport::{HttpRequest, HttpResponse, HttpTransport, Method};

/// Sends requests to the remote store over HTTPS.
///
/// Each attempt is bounded by the configured request timeout; an elapsed
/// timeout surfaces as a network error.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Shared connection pool.
    client: reqwest::Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport from store configuration.
    pub fn new(config: &StoreConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    let message = if err.is_timeout() {
        format!("Request timed out: {err}")
    } else if err.is_connect() {
        format!("Connection failed: {err}")
    } else {
        format!("Transport error: {err}")
    };
    AppError::with_source(ErrorKind::Network, message, err)
}
