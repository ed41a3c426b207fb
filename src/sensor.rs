use crate::error::Result;
use crate::property::Properties;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A wireless sensor paired with the spa (cover, water, ...)
///
/// Only reported as part of the full status.
#[derive(Debug, Clone)]
pub struct SpaSensor {
    pub address: Option<String>,
    pub name: Option<String>,
    pub sensor_type: Option<String>,
    pub sub_type: Option<String>,
    pub magnet: Option<bool>,
    pub motion_sensor: Option<bool>,
    pub pressure_sensor: Option<f64>,
    pub battery_level: Option<f64>,
    pub rssi: Option<i64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub properties: Map<String, Value>,
}

impl SpaSensor {
    pub(crate) fn decode(map: Map<String, Value>) -> Result<Self> {
        let mut p = Properties::from_map("SpaSensor", map);
        Ok(Self {
            address: p.value("address")?,
            name: p.value("name")?,
            sensor_type: p.value("type")?,
            sub_type: p.value("subType")?,
            magnet: p.value("magnet")?,
            motion_sensor: p.value("motionSensor")?,
            pressure_sensor: p.value("pressureSensor")?,
            battery_level: p.value("batteryLevel")?,
            rssi: p.value("rssi")?,
            last_updated: p.timestamp("lastUpdated")?,
            properties: p.finish(),
        })
    }
}
