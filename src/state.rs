use crate::error::{Result, SmartTubError};
use crate::light::SpaLight;
use crate::property::{parse_timestamp, Properties};
use crate::pump::SpaPump;
use crate::sensor::SpaSensor;
use crate::spa::SpaContext;
use crate::types::{
    Celsius, CycleStatus, HeatMode, PrimaryFiltrationMode, SecondaryFiltrationMode, TemperatureFormat,
    TimeFormat,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Lock state value reported when a lock is engaged
pub const LOCKED: &str = "LOCKED";
/// Lock state value reported when a lock is released
pub const UNLOCKED: &str = "UNLOCKED";

/// PIN the vendor app sends with every lock and unlock command
const LOCK_CODE: &str = "0772";

/// Snapshot of a spa's state.
///
/// Returned by both the status and full status queries. `pumps`, `lights`
/// and `sensors` are only populated by the full status.
#[derive(Debug, Clone)]
pub struct SpaState {
    pub ambient_temperature: Option<Celsius>,
    pub blowout_cycle: Option<CycleStatus>,
    pub cleanup_cycle: Option<CycleStatus>,
    pub current: Option<Value>,
    pub date: Option<NaiveDate>,
    pub demo_mode: Option<String>,
    pub dip_switches: Option<Value>,
    pub display_temperature_format: Option<TemperatureFormat>,
    pub error: Option<Value>,
    pub error_code: Option<i64>,
    pub fields_last_updated: Option<BTreeMap<String, Option<DateTime<Utc>>>>,
    pub flow_switch: Option<String>,
    pub heat_mode: Option<HeatMode>,
    pub heater: Option<String>,
    pub high_temperature_limit: Option<Celsius>,
    pub last_updated: Option<DateTime<Utc>>,
    pub location: Option<Value>,
    /// Keyed by lock kind, e.g. `"temperature"` or `"access"`
    pub locks: Option<BTreeMap<String, SpaLock>>,
    pub online: Option<bool>,
    pub ozone: Option<String>,
    pub primary_filtration: Option<SpaPrimaryFiltrationCycle>,
    pub secondary_filtration: Option<SpaSecondaryFiltrationCycle>,
    pub set_temperature: Option<Celsius>,
    pub state: Option<String>,
    pub time: Option<NaiveTime>,
    pub time_format: Option<TimeFormat>,
    pub time_set: Option<Value>,
    pub timezone: Option<String>,
    pub uv: Option<String>,
    pub uv_on_demand: Option<String>,
    pub versions: Option<Map<String, Value>>,
    pub water: Option<SpaWaterState>,
    pub watercare: Option<Value>,
    pub pumps: Option<Vec<SpaPump>>,
    pub lights: Option<Vec<SpaLight>>,
    pub sensors: Option<Vec<SpaSensor>>,
    /// Raw status document, including properties without a typed field
    pub properties: Map<String, Value>,
}

impl SpaState {
    pub(crate) fn decode(ctx: &SpaContext, value: Value) -> Result<Self> {
        let mut p = Properties::new("SpaState", value)?;
        Ok(Self {
            ambient_temperature: p.value("ambientTemperature")?,
            blowout_cycle: p.value("blowoutCycle")?,
            cleanup_cycle: p.value("cleanupCycle")?,
            current: p.value("current")?,
            date: p.value("date")?,
            demo_mode: p.value("demoMode")?,
            dip_switches: p.value("dipSwitches")?,
            display_temperature_format: p.value("displayTemperatureFormat")?,
            error: p.value("error")?,
            error_code: p.value("errorCode")?,
            fields_last_updated: p.convert("fieldsLastUpdated", timestamp_map)?,
            flow_switch: p.value("flowSwitch")?,
            heat_mode: p.value("heatMode")?,
            heater: p.value("heater")?,
            high_temperature_limit: p.value("highTemperatureLimit")?,
            last_updated: p.timestamp("lastUpdated")?,
            location: p.value("location")?,
            locks: p.convert("locks", |v| lock_map(ctx, v))?,
            online: p.value("online")?,
            ozone: p.value("ozone")?,
            primary_filtration: p.nested("primaryFiltration", |m| SpaPrimaryFiltrationCycle::decode(ctx, m))?,
            secondary_filtration: p
                .nested("secondaryFiltration", |m| SpaSecondaryFiltrationCycle::decode(ctx, m))?,
            set_temperature: p.value("setTemperature")?,
            state: p.value("state")?,
            time: p.value("time")?,
            time_format: p.value("timeFormat")?,
            time_set: p.value("timeSet")?,
            timezone: p.value("timezone")?,
            uv: p.value("uv")?,
            uv_on_demand: p.value("uvOnDemand")?,
            versions: p.value("versions")?,
            water: p.nested("water", SpaWaterState::decode)?,
            watercare: p.value("watercare")?,
            pumps: p.nested_list("pumps", |m| SpaPump::decode(ctx, m))?,
            lights: p.nested_list("lights", |m| SpaLight::decode(ctx, m))?,
            sensors: p.nested_list("sensors", SpaSensor::decode)?,
            properties: p.finish(),
        })
    }

    /// Lock of the given kind, if the spa reports one
    pub fn lock(&self, kind: &str) -> Option<&SpaLock> {
        self.locks.as_ref()?.get(kind)
    }

    pub fn pump(&self, id: &str) -> Option<&SpaPump> {
        self.pumps.as_ref()?.iter().find(|pump| pump.id == id)
    }

    pub fn light(&self, zone: i64) -> Option<&SpaLight> {
        self.lights.as_ref()?.iter().find(|light| light.zone == zone)
    }
}

fn timestamp_map(value: &Value) -> std::result::Result<BTreeMap<String, Option<DateTime<Utc>>>, String> {
    let Value::Object(map) = value else {
        return Err("expected an object of timestamps".to_string());
    };
    map.iter()
        .map(|(key, ts)| match ts {
            Value::Null => Ok((key.clone(), None)),
            Value::String(s) => parse_timestamp(s).map(|ts| (key.clone(), Some(ts))),
            _ => Err(format!("{key}: expected a timestamp string")),
        })
        .collect()
}

fn lock_map(ctx: &SpaContext, value: &Value) -> std::result::Result<BTreeMap<String, SpaLock>, String> {
    let Value::Object(map) = value else {
        return Err("expected an object of lock states".to_string());
    };
    map.iter()
        .map(|(kind, state)| match state {
            Value::String(state) => Ok((
                kind.clone(),
                SpaLock {
                    ctx: ctx.clone(),
                    kind: kind.clone(),
                    state: state.clone(),
                },
            )),
            _ => Err(format!("{kind}: expected a lock state string")),
        })
        .collect()
}

/// Water quality readings
#[derive(Debug, Clone, PartialEq)]
pub struct SpaWaterState {
    pub oxidation_reduction_potential: Option<f64>,
    pub ph: Option<f64>,
    pub temperature: Option<Celsius>,
    pub temperature_last_updated: Option<DateTime<Utc>>,
    pub turbidity: Option<f64>,
}

impl SpaWaterState {
    fn decode(map: Map<String, Value>) -> Result<Self> {
        let mut p = Properties::from_map("SpaWaterState", map);
        let water = Self {
            oxidation_reduction_potential: p.value("oxidationReductionPotential")?,
            ph: p.value("ph")?,
            temperature: p.value("temperature")?,
            temperature_last_updated: p.timestamp("temperatureLastUpdated")?,
            turbidity: p.value("turbidity")?,
        };
        p.finish();
        Ok(water)
    }
}

/// Daily primary filtration schedule
#[derive(Debug, Clone)]
pub struct SpaPrimaryFiltrationCycle {
    ctx: SpaContext,
    pub cycle: Option<i64>,
    /// Hours per day
    pub duration: Option<i64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub mode: Option<PrimaryFiltrationMode>,
    /// Hour of day, 0-23
    pub start_hour: Option<i64>,
    pub status: Option<CycleStatus>,
}

impl SpaPrimaryFiltrationCycle {
    fn decode(ctx: &SpaContext, map: Map<String, Value>) -> Result<Self> {
        let mut p = Properties::from_map("SpaPrimaryFiltrationCycle", map);
        let cycle = Self {
            ctx: ctx.clone(),
            cycle: p.value("cycle")?,
            duration: p.value("duration")?,
            last_updated: p.timestamp("lastUpdated")?,
            mode: p.value("mode")?,
            start_hour: p.value("startHour")?,
            status: p.value("status")?,
        };
        p.finish();
        Ok(cycle)
    }

    /// Change the schedule. Omitted values keep their current setting.
    pub async fn set(
        &self,
        cycle: Option<i64>,
        duration: Option<i64>,
        mode: Option<PrimaryFiltrationMode>,
        start_hour: Option<i64>,
    ) -> Result<()> {
        if let Some(duration) = duration {
            if !(1..=24).contains(&duration) {
                return Err(SmartTubError::InvalidArgument(format!(
                    "filtration duration must be 1-24 hours, got {duration}"
                )));
            }
        }
        if let Some(start_hour) = start_hour {
            if !(0..=23).contains(&start_hour) {
                return Err(SmartTubError::InvalidArgument(format!(
                    "filtration start hour must be 0-23, got {start_hour}"
                )));
            }
        }

        let cycle = cycle.or(self.cycle);
        let duration = duration.or(self.duration);
        let mode = mode.or(self.mode);
        let start_hour = start_hour.or(self.start_hour);
        let body = json!({
            "primaryFiltrationConfig": {
                "cycle": cycle,
                "duration": duration,
                "mode": mode,
                "startHour": start_hour,
            }
        });
        self.ctx.request(Method::PATCH, "config", Some(body)).await?;

        self.ctx
            .settle(
                "primary filtration schedule",
                || self.ctx.status(),
                |state| {
                    state.primary_filtration.as_ref().is_some_and(|pf| {
                        pf.cycle == cycle
                            && pf.duration == duration
                            && pf.mode == mode
                            && pf.start_hour == start_hour
                    })
                },
            )
            .await
    }
}

/// Secondary filtration mode
#[derive(Debug, Clone)]
pub struct SpaSecondaryFiltrationCycle {
    ctx: SpaContext,
    pub last_updated: Option<DateTime<Utc>>,
    pub mode: Option<SecondaryFiltrationMode>,
    pub status: Option<CycleStatus>,
}

impl SpaSecondaryFiltrationCycle {
    fn decode(ctx: &SpaContext, map: Map<String, Value>) -> Result<Self> {
        let mut p = Properties::from_map("SpaSecondaryFiltrationCycle", map);
        let cycle = Self {
            ctx: ctx.clone(),
            last_updated: p.timestamp("lastUpdated")?,
            mode: p.value("mode")?,
            status: p.value("status")?,
        };
        p.finish();
        Ok(cycle)
    }

    pub async fn set_mode(&self, mode: SecondaryFiltrationMode) -> Result<()> {
        self.ctx
            .request(
                Method::PATCH,
                "config",
                Some(json!({ "secondaryFiltrationConfig": mode })),
            )
            .await?;
        self.ctx
            .settle(
                &format!("secondary filtration {mode}"),
                || self.ctx.status(),
                |state| {
                    state
                        .secondary_filtration
                        .as_ref()
                        .is_some_and(|sf| sf.mode == Some(mode))
                },
            )
            .await
    }
}

/// One of the spa's locks, e.g. the temperature or access lock
#[derive(Debug, Clone)]
pub struct SpaLock {
    ctx: SpaContext,
    pub kind: String,
    pub state: String,
}

impl SpaLock {
    pub fn is_locked(&self) -> bool {
        self.state == LOCKED
    }

    /// Engage the lock. Does nothing if it is already locked.
    pub async fn lock(&self) -> Result<()> {
        self.transition("lock", LOCKED).await
    }

    /// Release the lock. Does nothing if it is already unlocked.
    pub async fn unlock(&self) -> Result<()> {
        self.transition("unlock", UNLOCKED).await
    }

    async fn transition(&self, resource: &str, target: &str) -> Result<()> {
        if self.state == target {
            tracing::debug!("{} lock already {}", self.kind, target);
            return Ok(());
        }

        let body = json!({
            "type": self.kind.to_uppercase(),
            "code": LOCK_CODE,
        });
        self.ctx.request(Method::POST, resource, Some(body)).await?;

        self.ctx
            .settle(
                &format!("{} lock {}", self.kind, target),
                || self.ctx.status(),
                |state| state.lock(&self.kind).is_some_and(|lock| lock.state == target),
            )
            .await
    }
}
