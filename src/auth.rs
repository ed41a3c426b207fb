//! Credential lifecycle: password login, claim decoding, transparent refresh.
//!
//! Expiry comes from the access token's own `exp` claim rather than a local
//! timer. The token signature is not verified; it is opaque to the client.

use crate::config::SmartTubConfig;
use crate::error::{Result, SmartTubError};
use crate::protocol::{
    PasswordGrantRequest, RefreshGrantRequest, TokenResponse, PASSWORD_REALM_GRANT,
    REFRESH_TOKEN_GRANT,
};
use crate::transport::{HttpRequest, HttpTransport};
use base64::prelude::*;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Claims decoded from an access token
pub type Claims = Map<String, Value>;

/// Bearer credential for one logged-in session
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub claims: Claims,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub account_id: String,
}

impl Credentials {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Owns the credential state of a single client
pub struct TokenManager {
    config: Arc<SmartTubConfig>,
    transport: Arc<dyn HttpTransport>,
    credentials: RwLock<Option<Credentials>>,
}

impl TokenManager {
    pub fn new(config: Arc<SmartTubConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            credentials: RwLock::new(None),
        }
    }

    /// Exchange username and password for a token set.
    ///
    /// Any non-2xx answer from the token endpoint is reported as
    /// `LoginFailed` with the response body.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let body = PasswordGrantRequest {
            audience: &self.config.audience,
            client_id: &self.config.client_id,
            grant_type: PASSWORD_REALM_GRANT,
            realm: &self.config.realm,
            scope: &self.config.scope,
            username,
            password,
        };
        let request = HttpRequest::new(Method::POST, &self.config.auth_url)
            .with_body(Some(to_json(&body)?));

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            tracing::warn!("Login rejected with HTTP {}", response.status);
            return Err(SmartTubError::LoginFailed(response.text()));
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| SmartTubError::decode("token response", e))?;

        match token.token_type.as_deref() {
            Some("Bearer") => {}
            other => {
                return Err(SmartTubError::LoginFailed(format!(
                    "unexpected token type {:?}",
                    other
                )))
            }
        }

        let refresh_token = token
            .refresh_token
            .ok_or_else(|| SmartTubError::decode("refresh_token", "missing from login response"))?;
        let claims = decode_claims(&token.access_token)?;
        let expires_at = expiry_from_claims(&claims)?;
        let account_id = account_id_from_claims(&claims, &self.config.account_id_claim)?;
        tracing::debug!(
            "Access token expires at {} (expires_in={:?})",
            expires_at,
            token.expires_in
        );

        *self.credentials.write().await = Some(Credentials {
            access_token: token.access_token,
            claims,
            refresh_token,
            expires_at,
            account_id,
        });

        tracing::debug!("Login successful, username={}", username);
        Ok(())
    }

    /// Return a usable access token, refreshing it first when expired.
    ///
    /// Two callers that both observe an expired token may both refresh; the
    /// later replacement wins. A failed refresh leaves the old credentials
    /// in place.
    pub async fn ensure_valid(&self) -> Result<String> {
        let current = self
            .credentials
            .read()
            .await
            .clone()
            .ok_or(SmartTubError::NotAuthenticated)?;

        if !current.is_expired() {
            return Ok(current.access_token);
        }

        tracing::debug!("Access token expired at {}, refreshing", current.expires_at);
        let refreshed = self.refresh(&current).await?;
        let token = refreshed.access_token.clone();
        *self.credentials.write().await = Some(refreshed);
        Ok(token)
    }

    async fn refresh(&self, current: &Credentials) -> Result<Credentials> {
        let body = RefreshGrantRequest {
            grant_type: REFRESH_TOKEN_GRANT,
            client_id: &self.config.client_id,
            refresh_token: &current.refresh_token,
        };
        let request = HttpRequest::new(Method::POST, &self.config.auth_url)
            .with_body(Some(to_json(&body)?));

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(SmartTubError::ApiError {
                status: Some(response.status),
                detail: response.text(),
            });
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)
            .map_err(|e| SmartTubError::decode("token response", e))?;
        let claims = decode_claims(&token.access_token)?;
        let expires_at = expiry_from_claims(&claims)?;

        tracing::debug!("Token refresh successful, expires at {}", expires_at);
        Ok(Credentials {
            access_token: token.access_token,
            claims,
            refresh_token: token
                .refresh_token
                .unwrap_or_else(|| current.refresh_token.clone()),
            expires_at,
            account_id: current.account_id.clone(),
        })
    }

    pub async fn is_logged_in(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    pub async fn account_id(&self) -> Result<String> {
        self.credentials
            .read()
            .await
            .as_ref()
            .map(|c| c.account_id.clone())
            .ok_or(SmartTubError::NotAuthenticated)
    }

    /// Snapshot of the current credentials
    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }
}

fn to_json<T: serde::Serialize>(body: &T) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| SmartTubError::decode("request body", e))
}

/// Decode the payload segment of a JWT without checking its signature
pub fn decode_claims(token: &str) -> Result<Claims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(SmartTubError::decode(
            "access_token",
            format!("expected 3 JWT segments, got {}", parts.len()),
        ));
    }

    let decoded = BASE64_URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| SmartTubError::decode("access_token", format!("base64: {e}")))?;

    match serde_json::from_slice(&decoded) {
        Ok(Value::Object(claims)) => Ok(claims),
        Ok(_) => Err(SmartTubError::decode("access_token", "claims are not an object")),
        Err(e) => Err(SmartTubError::decode("access_token", e)),
    }
}

fn expiry_from_claims(claims: &Claims) -> Result<DateTime<Utc>> {
    let exp = claims
        .get("exp")
        .and_then(Value::as_f64)
        .ok_or_else(|| SmartTubError::decode("exp", "missing or not numeric"))?;
    DateTime::from_timestamp_millis((exp * 1000.0) as i64)
        .ok_or_else(|| SmartTubError::decode("exp", format!("out of range: {exp}")))
}

fn account_id_from_claims(claims: &Claims, claim: &str) -> Result<String> {
    match claims.get(claim) {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(SmartTubError::decode(claim, "account id claim missing")),
    }
}
