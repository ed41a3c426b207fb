use crate::error::{Result, SmartTubError};
use crate::property::Properties;
use crate::spa::SpaContext;
use crate::types::LightMode;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// RGBW components of a light zone's color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

/// An addressable light zone
#[derive(Debug, Clone)]
pub struct SpaLight {
    ctx: SpaContext,
    pub zone: i64,
    pub color: Option<LightColor>,
    /// Brightness, 0-100
    pub intensity: Option<u8>,
    pub mode: Option<LightMode>,
    pub properties: Map<String, Value>,
}

impl SpaLight {
    pub(crate) fn decode(ctx: &SpaContext, map: Map<String, Value>) -> Result<Self> {
        let mut p = Properties::from_map("SpaLight", map);
        Ok(Self {
            ctx: ctx.clone(),
            zone: p.required("zone")?,
            color: p.value("color")?,
            intensity: p.value("intensity")?,
            mode: p.value("mode")?,
            properties: p.finish(),
        })
    }

    /// Set the zone's mode and intensity.
    ///
    /// `LightMode::Off` is only valid with intensity 0, and intensity 0 only
    /// with `LightMode::Off`.
    pub async fn set_mode(&self, mode: LightMode, intensity: u8) -> Result<()> {
        check_mode(mode, intensity)?;

        let body = json!({
            "intensity": intensity,
            "mode": mode,
        });
        self.ctx
            .request(Method::PATCH, &format!("lights/{}", self.zone), Some(body))
            .await?;

        self.ctx
            .settle(
                &format!("light zone {} {} at {}", self.zone, mode, intensity),
                || self.ctx.full_status(),
                |state| {
                    state
                        .light(self.zone)
                        .is_some_and(|light| light.mode == Some(mode) && light.intensity == Some(intensity))
                },
            )
            .await
    }

    pub async fn turn_off(&self) -> Result<()> {
        self.set_mode(LightMode::Off, 0).await
    }
}

fn check_mode(mode: LightMode, intensity: u8) -> Result<()> {
    if intensity > 100 {
        return Err(SmartTubError::InvalidArgument(format!(
            "light intensity must be 0-100, got {intensity}"
        )));
    }
    if (intensity == 0) != (mode == LightMode::Off) {
        return Err(SmartTubError::InvalidArgument(format!(
            "light mode {mode} is incompatible with intensity {intensity}"
        )));
    }
    Ok(())
}

impl fmt::Display for SpaLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SpaLight {}>", self.zone)
    }
}
