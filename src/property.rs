//! Fault-tolerant projection of vendor property maps onto typed fields.
//!
//! Each entity declares its fields by pulling them out of a [`Properties`]
//! one vendor key at a time. A key that is absent or `null` yields `None`
//! without running the converter; a present value that fails to convert is
//! a decode error naming the key. Keys nobody asked for stay in the raw map
//! and are reported at debug level when decoding finishes.

use crate::error::{Result, SmartTubError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Raw vendor properties of one entity, consumed field by field
#[derive(Debug, Clone)]
pub struct Properties {
    entity: &'static str,
    raw: Map<String, Value>,
    declared: Vec<&'static str>,
}

impl Properties {
    /// Wrap a JSON document, which must be an object
    pub fn new(entity: &'static str, value: Value) -> Result<Self> {
        match value {
            Value::Object(raw) => Ok(Self::from_map(entity, raw)),
            other => Err(SmartTubError::decode(
                entity,
                format!("expected an object, got {}", json_kind(&other)),
            )),
        }
    }

    pub fn from_map(entity: &'static str, raw: Map<String, Value>) -> Self {
        Self {
            entity,
            raw,
            declared: Vec::new(),
        }
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    fn lookup(&mut self, key: &'static str) -> Option<Value> {
        self.declared.push(key);
        match self.raw.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value.clone()),
        }
    }

    fn error(&self, key: &str, detail: impl std::fmt::Display) -> SmartTubError {
        SmartTubError::decode(
            format!("{}.{} ({})", self.entity, attribute_name(key), key),
            detail,
        )
    }

    /// Deserialize the value under `key` as-is
    pub fn value<T: DeserializeOwned>(&mut self, key: &'static str) -> Result<Option<T>> {
        match self.lookup(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| self.error(key, e)),
        }
    }

    /// Like [`value`](Self::value), but absence is an error. Only for
    /// identity keys (`id`, `zone`), which are exempt from absent-as-`None`.
    pub fn required<T: DeserializeOwned>(&mut self, key: &'static str) -> Result<T> {
        self.value(key)?
            .ok_or_else(|| self.error(key, "required property is missing"))
    }

    /// Run a custom converter over the value under `key`
    pub fn convert<T, F>(&mut self, key: &'static str, convert: F) -> Result<Option<T>>
    where
        F: FnOnce(&Value) -> std::result::Result<T, String>,
    {
        match self.lookup(key) {
            None => Ok(None),
            Some(value) => convert(&value).map(Some).map_err(|e| self.error(key, e)),
        }
    }

    /// ISO-8601 instant
    pub fn timestamp(&mut self, key: &'static str) -> Result<Option<DateTime<Utc>>> {
        self.convert(key, |value| match value {
            Value::String(s) => parse_timestamp(s),
            other => Err(format!("expected a timestamp string, got {}", json_kind(other))),
        })
    }

    /// Decode a nested object with its own field declarations
    pub fn nested<T, F>(&mut self, key: &'static str, decode: F) -> Result<Option<T>>
    where
        F: FnOnce(Map<String, Value>) -> Result<T>,
    {
        match self.lookup(key) {
            None => Ok(None),
            Some(Value::Object(map)) => decode(map).map(Some),
            Some(other) => Err(self.error(key, format!("expected an object, got {}", json_kind(&other)))),
        }
    }

    /// Decode an array of nested objects
    pub fn nested_list<T, F>(&mut self, key: &'static str, mut decode: F) -> Result<Option<Vec<T>>>
    where
        F: FnMut(Map<String, Value>) -> Result<T>,
    {
        match self.lookup(key) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => decode(map),
                    other => Err(self.error(key, format!("expected array of objects, found {}", json_kind(&other)))),
                })
                .collect::<Result<Vec<T>>>()
                .map(Some),
            Some(other) => Err(self.error(key, format!("expected an array, got {}", json_kind(&other)))),
        }
    }

    /// Finish decoding and hand back the raw map
    pub fn finish(self) -> Map<String, Value> {
        let unknown: Vec<&str> = self
            .raw
            .keys()
            .map(String::as_str)
            .filter(|k| !self.declared.iter().any(|d| d == k))
            .collect();
        if !unknown.is_empty() {
            tracing::debug!("{}: keeping undeclared vendor properties {:?}", self.entity, unknown);
        }
        self.raw
    }
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Values without an offset, and date-only values, are taken as UTC.
pub fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let rfc3339 = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc)),
        Err(e) => e,
    };
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(format!("invalid timestamp {s:?}: {rfc3339}"))
}

/// snake_case attribute name for a camelCase vendor key
pub fn attribute_name(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase() || prev.is_ascii_digit() || (prev.is_ascii_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
