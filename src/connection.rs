use crate::auth::TokenManager;
use crate::config::SmartTubConfig;
use crate::error::{Result, SmartTubError};
use crate::transport::{HttpRequest, HttpTransport};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Authenticated request pipeline shared by the client and every entity
/// handed out by it
pub struct ApiConnection {
    config: Arc<SmartTubConfig>,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenManager,
}

impl ApiConnection {
    pub fn new(config: SmartTubConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let config = Arc::new(config);
        let tokens = TokenManager::new(config.clone(), transport.clone());
        Self {
            config,
            transport,
            tokens,
        }
    }

    pub fn config(&self) -> &SmartTubConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Make an authenticated request against a path relative to the API base.
    ///
    /// Returns `None` when the response body is empty, otherwise the parsed
    /// JSON document.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Option<Value>> {
        let token = self.tokens.ensure_valid().await?;

        let request = HttpRequest::new(method.clone(), self.url(path))
            .with_bearer(token)
            .with_body(body);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            tracing::debug!("{} {} failed with HTTP {}", method, path, response.status);
            return Err(SmartTubError::ApiError {
                status: Some(response.status),
                detail: response.text(),
            });
        }

        if response.body.is_empty() {
            tracing::debug!("{} {} successful: no content", method, path);
            return Ok(None);
        }

        let json: Value = serde_json::from_slice(&response.body)
            .map_err(|e| SmartTubError::decode(format!("response to {method} {path}"), e))?;
        tracing::debug!("{} {} successful: {}", method, path, json);
        Ok(Some(json))
    }

    /// Like [`request`](Self::request), but an empty body is a decode error
    pub async fn request_json(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        self.request(method.clone(), path, body)
            .await?
            .ok_or_else(|| SmartTubError::decode(format!("response to {method} {path}"), "empty body"))
    }
}
