//! Client configuration.
//!
//! Defaults point at the production SmartTub identity provider and API.
//! Tests and proxies override the two URLs with the `with_*` setters.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_AUTH_URL: &str = "https://smarttub.auth0.com/oauth/token";
const DEFAULT_API_BASE: &str = "https://api.smarttub.io";
const DEFAULT_CLIENT_ID: &str = "dB7Rcp3rfKKh0vHw2uqkwOZmRb5WNjQC";
const DEFAULT_AUDIENCE: &str = "https://api.operation-link.com/";
const DEFAULT_REALM: &str = "Username-Password-Authentication";
const DEFAULT_SCOPE: &str = "openid email offline_access User Admin";
const DEFAULT_ACCOUNT_ID_CLAIM: &str = "http://operation-link.com/account_id";

/// Settings for a [`SmartTub`](crate::SmartTub) session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartTubConfig {
    /// Token endpoint used for both the password grant and refreshes.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Origin every resource path is resolved against.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_audience")]
    pub audience: String,

    #[serde(default = "default_realm")]
    pub realm: String,

    #[serde(default = "default_scope")]
    pub scope: String,

    /// Access token claim holding the account identifier.
    #[serde(default = "default_account_id_claim")]
    pub account_id_claim: String,

    /// Per-request timeout applied by the built-in transport.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// How mutating commands wait for their effect. `None` makes them
    /// return as soon as the command is accepted.
    #[serde(default = "default_convergence")]
    pub convergence: Option<ConvergencePolicy>,
}

/// Deadline and fixed polling interval for convergence waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergencePolicy {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl ConvergencePolicy {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout_ms: saturating_millis(timeout),
            poll_interval_ms: saturating_millis(poll_interval),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            poll_interval_ms: 1_000,
        }
    }
}

impl SmartTubConfig {
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_convergence(mut self, policy: Option<ConvergencePolicy>) -> Self {
        self.convergence = policy;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SmartTubConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            api_base: default_api_base(),
            client_id: default_client_id(),
            audience: default_audience(),
            realm: default_realm(),
            scope: default_scope(),
            account_id_claim: default_account_id_claim(),
            request_timeout_ms: default_request_timeout_ms(),
            convergence: default_convergence(),
        }
    }
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_account_id_claim() -> String {
    DEFAULT_ACCOUNT_ID_CLAIM.to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_convergence() -> Option<ConvergencePolicy> {
    Some(ConvergencePolicy::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: SmartTubConfig =
            serde_json::from_str(r#"{"api_base": "http://localhost:8080"}"#).unwrap();
        assert_eq!(config.api_base, "http://localhost:8080");
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
        assert_eq!(config.convergence, Some(ConvergencePolicy::default()));
    }

    #[test]
    fn convergence_can_be_disabled() {
        let config: SmartTubConfig = serde_json::from_str(r#"{"convergence": null}"#).unwrap();
        assert!(config.convergence.is_none());
    }

    #[test]
    fn huge_convergence_durations_saturate() {
        let policy = ConvergencePolicy::new(Duration::MAX, Duration::from_secs(1));
        assert_eq!(policy.timeout_ms, u64::MAX);
        assert_eq!(policy.poll_interval_ms, 1_000);
    }

    #[test]
    fn api_base_trailing_slash_is_trimmed() {
        let config = SmartTubConfig::default().with_api_base("http://127.0.0.1:1234/");
        assert_eq!(config.api_base, "http://127.0.0.1:1234");
    }
}
