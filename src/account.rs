use crate::connection::ApiConnection;
use crate::error::{Result, SmartTubError};
use crate::property::Properties;
use crate::protocol::{Page, SpaSummary};
use crate::spa::Spa;
use crate::types::AccountId;
use futures_util::future::try_join_all;
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use url::form_urlencoded;

/// The logged-in user's account
#[derive(Clone)]
pub struct Account {
    api: Arc<ApiConnection>,
    id: AccountId,
    email: Option<String>,
    properties: Map<String, Value>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl Account {
    pub(crate) fn decode(api: Arc<ApiConnection>, value: Value) -> Result<Self> {
        let mut p = Properties::new("Account", value)?;
        let id = p.convert("id", |v| match v {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err("expected a string or number".to_string()),
        })?;
        let id = id.ok_or_else(|| SmartTubError::decode("Account.id (id)", "required property is missing"))?;
        Ok(Self {
            api,
            id,
            email: p.value("email")?,
            properties: p.finish(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Raw account document as returned by the API
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Fetch every spa owned by this account.
    ///
    /// Spa documents are fetched concurrently; the result keeps the order of
    /// the listing.
    pub async fn get_spas(&self) -> Result<Vec<Spa>> {
        let listing = self
            .api
            .request_json(Method::GET, &format!("spas?ownerId={}", query_value(&self.id)), None)
            .await?;
        let page: Page =
            serde_json::from_value(listing).map_err(|e| SmartTubError::decode("spa listing", e))?;

        let ids = page
            .content
            .into_iter()
            .map(|summary| {
                serde_json::from_value::<SpaSummary>(summary)
                    .map(|s| s.id)
                    .map_err(|e| SmartTubError::decode("spa listing entry", e))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Account {} owns {} spa(s)", self.id, ids.len());
        try_join_all(ids.iter().map(|id| self.get_spa(id))).await
    }

    pub async fn get_spa(&self, spa_id: &str) -> Result<Spa> {
        let document = self
            .api
            .request_json(Method::GET, &format!("spas/{spa_id}"), None)
            .await?;
        Spa::decode(self.api.clone(), self.id.clone(), document)
    }
}

fn query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Account {}>", self.id)
    }
}
