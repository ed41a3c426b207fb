use crate::error::Result;
use crate::property::Properties;
use crate::spa::SpaContext;
use crate::types::{PumpState, PumpType};
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;

/// A jet, circulation pump or blower
#[derive(Debug, Clone)]
pub struct SpaPump {
    ctx: SpaContext,
    pub id: String,
    pub speed: Option<String>,
    pub state: Option<PumpState>,
    pub pump_type: Option<PumpType>,
    pub properties: Map<String, Value>,
}

impl SpaPump {
    pub(crate) fn decode(ctx: &SpaContext, map: Map<String, Value>) -> Result<Self> {
        let mut p = Properties::from_map("SpaPump", map);
        Ok(Self {
            ctx: ctx.clone(),
            id: p.required("id")?,
            speed: p.value("speed")?,
            state: p.value("state")?,
            pump_type: p.value("type")?,
            properties: p.finish(),
        })
    }

    /// Advance the pump to its next state.
    ///
    /// Which state comes next depends on the pump, so this waits until the
    /// full status reports this pump in any state other than this snapshot's.
    pub async fn toggle(&self) -> Result<()> {
        self.ctx
            .request(Method::POST, &format!("pumps/{}/toggle", self.id), None)
            .await?;

        let before = self.state;
        self.ctx
            .settle(
                &format!("pump {} toggle", self.id),
                || self.ctx.full_status(),
                |state| state.pump(&self.id).is_some_and(|pump| pump.state != before),
            )
            .await
    }
}

impl fmt::Display for SpaPump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SpaPump {}>", self.id)
    }
}
