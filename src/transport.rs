//! HTTP transport seam.
//!
//! The request pipeline only needs "send this request, give me status and
//! body". [`ReqwestTransport`] is the production implementation; anything
//! else implementing [`HttpTransport`] can stand in for it.

use crate::error::{Result, SmartTubError};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// A single outgoing HTTP request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }
}

/// Status and raw body of a completed exchange
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Anything able to carry an [`HttpRequest`] to the service.
///
/// Implementations return `Ok` for every response that has a status, 2xx or
/// not; only failures without a status (connect, timeout, body read) are
/// errors, reported as `ApiError { status: None, .. }`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with its own connection pool
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SmartTubError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { inner })
    }

    /// Reuse an existing client (and its connection pool)
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.inner.request(request.method, &request.url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify_error)?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

fn classify_error(e: reqwest::Error) -> SmartTubError {
    let detail = if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    };
    SmartTubError::ApiError {
        status: None,
        detail,
    }
}
