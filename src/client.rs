use crate::account::Account;
use crate::auth::Credentials;
use crate::config::SmartTubConfig;
use crate::connection::ApiConnection;
use crate::error::Result;
use crate::transport::{HttpTransport, ReqwestTransport};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Client for the SmartTub cloud API
///
/// One `SmartTub` holds one logged-in session. Accounts and spas handed out
/// by it share that session, including its transparent token refresh.
#[derive(Clone)]
pub struct SmartTub {
    api: Arc<ApiConnection>,
}

impl SmartTub {
    /// Client for the production service with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(SmartTubConfig::default())
    }

    /// Client using the built-in `reqwest` transport
    pub fn with_config(config: SmartTubConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client sending every request through `transport`
    ///
    /// A transport can be shared between clients to share its connection pool.
    pub fn with_transport(config: SmartTubConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api: Arc::new(ApiConnection::new(config, transport)),
        }
    }

    /// Log in with the account's username (email) and password
    ///
    /// # Example
    ///
    /// ```no_run
    /// use smarttub::SmartTub;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = SmartTub::new()?;
    ///     client.login("user@example.com", "password").await?;
    ///     let account = client.get_account().await?;
    ///     for spa in account.get_spas().await? {
    ///         println!("{}", spa.name());
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.api.tokens().login(username, password).await
    }

    pub async fn is_logged_in(&self) -> bool {
        self.api.tokens().is_logged_in().await
    }

    /// Account id taken from the access token
    pub async fn account_id(&self) -> Result<String> {
        self.api.tokens().account_id().await
    }

    /// Snapshot of the session's current credentials, `None` before login
    pub async fn credentials(&self) -> Option<Credentials> {
        self.api.tokens().credentials().await
    }

    pub async fn get_account(&self) -> Result<Account> {
        let account_id = self.account_id().await?;
        let document = self
            .api
            .request_json(Method::GET, &format!("accounts/{account_id}"), None)
            .await?;
        Account::decode(self.api.clone(), document)
    }

    /// Make an authenticated request against a path relative to the API base
    ///
    /// Returns `None` for an empty response body.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Option<Value>> {
        self.api.request(method, path, body).await
    }
}
