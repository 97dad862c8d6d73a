//! HTTP capability for API-backed probes.
//!
//! Probes depend on the [`HttpApi`] trait, not on reqwest, so tests inject
//! hand-written doubles and the network never comes up in unit tests.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::HttpError;

/// Default request deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum body length echoed into error messages.
const ERROR_BODY_LIMIT: usize = 512;

// ============================================================================
// Request / Response
// ============================================================================

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

/// A minimal HTTP request description.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Builds a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Builds a POST request with a JSON body.
    pub fn post_json(url: impl Into<String>, body: &serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body.to_string().into_bytes()),
        }
    }

    /// Adds a bearer-token authorization header.
    pub fn bearer(mut self, token: &str) -> Self {
        self.headers
            .push(("Authorization".to_string(), format!("Bearer {token}")));
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response bytes plus status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text (lossy).
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Converts a non-success response into an [`HttpError::Status`].
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.is_success() {
            Ok(self)
        } else {
            let mut body = self.body_text();
            body.truncate(ERROR_BODY_LIMIT);
            Err(HttpError::Status {
                status: self.status,
                body,
            })
        }
    }
}

// ============================================================================
// Capability trait
// ============================================================================

/// Network capability consumed by API-based probes.
#[async_trait]
pub trait HttpApi: Send + Sync {
    /// Issues a request and returns the response bytes.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

// ============================================================================
// Reqwest-backed client
// ============================================================================

/// Production [`HttpApi`] implementation over reqwest.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a client with the default deadline.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quotabar/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client, timeout }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpApi for HttpClient {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.timeout)
            } else {
                HttpError::Request(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(HttpError::Request)?.to_vec();

        debug!(status = status, body_len = body.len(), "HTTP response");
        Ok(HttpResponse { status, body })
    }
}
