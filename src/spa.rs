use crate::connection::ApiConnection;
use crate::convergence;
use crate::error::{Result, SmartTubError};
use crate::light::SpaLight;
use crate::property::Properties;
use crate::protocol::Page;
use crate::pump::SpaPump;
use crate::reminder::{SpaError, SpaReminder};
use crate::sensor::SpaSensor;
use crate::state::SpaState;
use crate::types::{round_setpoint, AccountId, Celsius, EnergyUsageInterval, HeatMode, SpaId, TemperatureFormat};
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Request scope shared by a spa and every sub-entity decoded from it
#[derive(Clone)]
pub(crate) struct SpaContext {
    api: Arc<ApiConnection>,
    spa_id: SpaId,
}

impl fmt::Debug for SpaContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaContext").field("spa_id", &self.spa_id).finish()
    }
}

impl SpaContext {
    pub(crate) fn new(api: Arc<ApiConnection>, spa_id: SpaId) -> Self {
        Self { api, spa_id }
    }

    pub(crate) fn spa_id(&self) -> &str {
        &self.spa_id
    }

    /// Request a resource below `spas/{id}/`
    pub(crate) async fn request(&self, method: Method, resource: &str, body: Option<Value>) -> Result<Option<Value>> {
        self.api
            .request(method, &format!("spas/{}/{}", self.spa_id, resource), body)
            .await
    }

    pub(crate) async fn request_json(&self, method: Method, resource: &str, body: Option<Value>) -> Result<Value> {
        self.api
            .request_json(method, &format!("spas/{}/{}", self.spa_id, resource), body)
            .await
    }

    pub(crate) async fn status(&self) -> Result<SpaState> {
        SpaState::decode(self, self.request_json(Method::GET, "status", None).await?)
    }

    pub(crate) async fn full_status(&self) -> Result<SpaState> {
        SpaState::decode(self, self.request_json(Method::GET, "fullStatus", None).await?)
    }

    pub(crate) async fn reminders(&self) -> Result<Vec<SpaReminder>> {
        let response = self.request_json(Method::GET, "reminders", None).await?;
        let mut p = Properties::new("reminders response", response)?;
        Ok(p
            .nested_list("reminders", |m| SpaReminder::decode(self, m))?
            .unwrap_or_default())
    }

    /// Block until `predicate` holds on freshly fetched state, unless
    /// convergence waiting is disabled in the configuration
    pub(crate) async fn settle<T, F, Fut, P>(&self, what: &str, fetch: F, predicate: P) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: FnMut(&T) -> bool,
    {
        match self.api.config().convergence {
            Some(policy) => {
                let what = format!("{} on spa {}", what, self.spa_id);
                convergence::wait_until(&what, &policy, fetch, predicate).await?;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// A single hot tub registered to an account
///
/// Cheap to clone; every clone talks through the same session.
#[derive(Clone, Debug)]
pub struct Spa {
    ctx: SpaContext,
    account_id: AccountId,
    brand: Option<String>,
    model: Option<String>,
    name: String,
    properties: Map<String, Value>,
}

impl Spa {
    pub(crate) fn decode(api: Arc<ApiConnection>, account_id: AccountId, value: Value) -> Result<Self> {
        let mut p = Properties::new("Spa", value)?;
        let id: SpaId = p.required("id")?;
        let brand: Option<String> = p.value("brand")?;
        let model: Option<String> = p.value("model")?;

        let name = match (&brand, &model) {
            (Some(brand), Some(model)) => format!("{brand} {model}"),
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => id.clone(),
        };

        Ok(Self {
            ctx: SpaContext::new(api, id),
            account_id,
            brand,
            model,
            name,
            properties: p.finish(),
        })
    }

    pub fn id(&self) -> &str {
        self.ctx.spa_id()
    }

    /// Id of the account this spa was fetched through
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Display name, `"{brand} {model}"`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw spa document as returned by the API
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Make an authenticated request against a resource of this spa
    pub async fn request(&self, method: Method, resource: &str, body: Option<Value>) -> Result<Option<Value>> {
        self.ctx.request(method, resource, body).await
    }

    // ========== Queries ==========

    /// Current state (without pump, light and sensor arrays)
    pub async fn get_status(&self) -> Result<SpaState> {
        self.ctx.status().await
    }

    /// Current state including pumps, lights and sensors
    pub async fn get_status_full(&self) -> Result<SpaState> {
        self.ctx.full_status().await
    }

    pub async fn get_pumps(&self) -> Result<Vec<SpaPump>> {
        let response = self.ctx.request_json(Method::GET, "pumps", None).await?;
        let mut p = Properties::new("pumps response", response)?;
        Ok(p
            .nested_list("pumps", |m| SpaPump::decode(&self.ctx, m))?
            .unwrap_or_default())
    }

    pub async fn get_lights(&self) -> Result<Vec<SpaLight>> {
        let response = self.ctx.request_json(Method::GET, "lights", None).await?;
        let mut p = Properties::new("lights response", response)?;
        Ok(p
            .nested_list("lights", |m| SpaLight::decode(&self.ctx, m))?
            .unwrap_or_default())
    }

    /// Sensors are only reported as part of the full status
    pub async fn get_sensors(&self) -> Result<Vec<SpaSensor>> {
        Ok(self.ctx.full_status().await?.sensors.unwrap_or_default())
    }

    pub async fn get_errors(&self) -> Result<Vec<SpaError>> {
        let response = self.ctx.request_json(Method::GET, "errors", None).await?;
        let page: Page =
            serde_json::from_value(response).map_err(|e| SmartTubError::decode("errors response", e))?;
        page.content.into_iter().map(SpaError::decode).collect()
    }

    pub async fn get_reminders(&self) -> Result<Vec<SpaReminder>> {
        self.ctx.reminders().await
    }

    /// Vendor diagnostic document, returned undecoded
    pub async fn get_debug_status(&self) -> Result<Value> {
        let response = self.ctx.request_json(Method::GET, "debugStatus", None).await?;
        Properties::new("debug status response", response)?.required("debugStatus")
    }

    /// Energy usage buckets between two dates, returned undecoded
    pub async fn get_energy_usage(
        &self,
        interval: EnergyUsageInterval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Value>> {
        let body = json!({
            "start": start.format("%Y-%m-%d").to_string(),
            "end": end.format("%Y-%m-%d").to_string(),
            "interval": interval,
        });
        let response = self.ctx.request_json(Method::POST, "energyUsage", Some(body)).await?;
        Properties::new("energy usage response", response)?.required("buckets")
    }

    // ========== Configuration ==========

    pub async fn set_heat_mode(&self, mode: HeatMode) -> Result<()> {
        self.ctx
            .request(Method::PATCH, "config", Some(json!({ "heatMode": mode })))
            .await?;
        self.ctx
            .settle(
                &format!("heat mode {mode}"),
                || self.ctx.status(),
                |state| state.heat_mode == Some(mode),
            )
            .await
    }

    /// Set the target temperature, rounded to one decimal place
    pub async fn set_temperature(&self, temp: Celsius) -> Result<()> {
        let temp = round_setpoint(temp);
        self.ctx
            .request(Method::PATCH, "config", Some(json!({ "setTemperature": temp })))
            .await?;
        self.ctx
            .settle(
                &format!("set temperature {temp}"),
                || self.ctx.status(),
                |state| state.set_temperature.map(round_setpoint) == Some(temp),
            )
            .await
    }

    pub async fn set_temperature_format(&self, format: TemperatureFormat) -> Result<()> {
        self.ctx
            .request(
                Method::PATCH,
                "config",
                Some(json!({ "displayTemperatureFormat": format })),
            )
            .await?;
        self.ctx
            .settle(
                &format!("temperature format {format}"),
                || self.ctx.status(),
                |state| state.display_temperature_format == Some(format),
            )
            .await
    }

    /// Set the spa clock. At least one of `date` and `time` is required.
    ///
    /// The clock keeps running, so this does not wait for convergence.
    pub async fn set_date_time(&self, date: Option<NaiveDate>, time: Option<NaiveTime>) -> Result<()> {
        if date.is_none() && time.is_none() {
            return Err(SmartTubError::InvalidArgument(
                "at least one of date or time must be specified".to_string(),
            ));
        }

        let mut config = Map::new();
        if let Some(date) = date {
            config.insert("date".to_string(), json!(date.format("%Y-%m-%d").to_string()));
        }
        if let Some(time) = time {
            config.insert("time".to_string(), json!(time.format("%H:%M").to_string()));
        }

        self.ctx
            .request(Method::PATCH, "config", Some(json!({ "dateTimeConfig": config })))
            .await?;
        Ok(())
    }

    /// Toggle the ClearRay UV system.
    ///
    /// The resulting state is not known in advance; with a pre-toggle
    /// snapshot this waits until the reported UV state differs from it,
    /// otherwise it only sends the command.
    pub async fn toggle_clearray(&self, before: Option<&SpaState>) -> Result<()> {
        self.ctx.request(Method::POST, "clearray/toggle", None).await?;

        if let Some(before) = before {
            let previous = before.uv.clone();
            self.ctx
                .settle(
                    "ClearRay toggle",
                    || self.ctx.status(),
                    |state| state.uv != previous,
                )
                .await?;
        }
        Ok(())
    }
}

impl fmt::Display for Spa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Spa {}>", self.id())
    }
}
