use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Grant type for the realm-scoped password exchange
pub const PASSWORD_REALM_GRANT: &str = "http://auth0.com/oauth/grant-type/password-realm";

/// Grant type for exchanging a refresh token
pub const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// Token endpoint request for the initial login
#[derive(Debug, Clone, Serialize)]
pub struct PasswordGrantRequest<'a> {
    pub audience: &'a str,
    pub client_id: &'a str,
    pub grant_type: &'a str,
    pub realm: &'a str,
    pub scope: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// Token endpoint request for a refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshGrantRequest<'a> {
    pub grant_type: &'a str,
    pub client_id: &'a str,
    pub refresh_token: &'a str,
}

/// Token endpoint response
///
/// Refresh responses carry only `access_token`; the other fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Paginated listing envelope (`spas?ownerId=`, `errors`)
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub content: Vec<Value>,
}

/// Spa summary inside a `spas?ownerId=` listing
#[derive(Debug, Clone, Deserialize)]
pub struct SpaSummary {
    pub id: String,
}
