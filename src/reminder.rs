//! Maintenance reminders and reported faults.

use crate::error::{Result, SmartTubError};
use crate::property::Properties;
use crate::spa::SpaContext;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::fmt;

/// A maintenance reminder, e.g. "clean filter" or "refresh water"
#[derive(Debug, Clone)]
pub struct SpaReminder {
    ctx: SpaContext,
    pub id: String,
    pub name: Option<String>,
    pub remaining_days: Option<i64>,
    pub snoozed: Option<bool>,
    pub state: Option<String>,
    /// Not reported for every reminder
    pub last_updated: Option<DateTime<Utc>>,
    pub properties: Map<String, Value>,
}

impl SpaReminder {
    pub(crate) fn decode(ctx: &SpaContext, map: Map<String, Value>) -> Result<Self> {
        let mut p = Properties::from_map("SpaReminder", map);
        Ok(Self {
            ctx: ctx.clone(),
            id: p.required("id")?,
            name: p.value("name")?,
            remaining_days: p.value("remainingDuration")?,
            snoozed: p.value("snoozed")?,
            state: p.value("state")?,
            last_updated: p.timestamp("lastUpdated")?,
            properties: p.finish(),
        })
    }

    /// Postpone the reminder by `days`
    pub async fn snooze(&self, days: i64) -> Result<()> {
        self.update(json!({ "remainingDuration": check_days(days)? }), days)
            .await
    }

    /// Mark the maintenance as done and restart the countdown at `days`
    pub async fn reset(&self, days: i64) -> Result<()> {
        self.update(
            json!({ "remainingDuration": check_days(days)?, "reset": true }),
            days,
        )
        .await
    }

    async fn update(&self, body: Value, days: i64) -> Result<()> {
        self.ctx
            .request(Method::PATCH, &format!("reminders/{}", self.id), Some(body))
            .await?;
        self.ctx
            .settle(
                &format!("reminder {} at {} days", self.id, days),
                || self.ctx.reminders(),
                |reminders| {
                    reminders
                        .iter()
                        .any(|r| r.id == self.id && r.remaining_days == Some(days))
                },
            )
            .await
    }
}

fn check_days(days: i64) -> Result<i64> {
    if days < 0 {
        return Err(SmartTubError::InvalidArgument(format!(
            "reminder duration cannot be negative, got {days}"
        )));
    }
    Ok(days)
}

impl fmt::Display for SpaReminder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SpaReminder {}>", self.id)
    }
}

/// A fault reported by the spa controller
#[derive(Debug, Clone, PartialEq)]
pub struct SpaError {
    pub code: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub error_type: Option<String>,
    pub properties: Map<String, Value>,
}

impl SpaError {
    pub(crate) fn decode(value: Value) -> Result<Self> {
        let mut p = Properties::new("SpaError", value)?;
        Ok(Self {
            code: p.value("code")?,
            title: p.value("title")?,
            description: p.value("description")?,
            created_at: p.timestamp("createdAt")?,
            updated_at: p.timestamp("updatedAt")?,
            active: p.value("active")?,
            error_type: p.value("errorType")?,
            properties: p.finish(),
        })
    }
}

impl fmt::Display for SpaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.title) {
            (Some(code), Some(title)) => write!(f, "<SpaError {code}: {title}>"),
            (Some(code), None) => write!(f, "<SpaError {code}>"),
            (None, Some(title)) => write!(f, "<SpaError {title}>"),
            (None, None) => f.write_str("<SpaError>"),
        }
    }
}
