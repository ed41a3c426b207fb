//! Shared helpers for integration tests
//!
//! `ScriptedTransport` replays queued responses in order and records every
//! request it was asked to send. Responses routed to a specific URL take
//! precedence over the queue, for requests issued concurrently.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::prelude::*;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use smarttub::{
    ConvergencePolicy, HttpRequest, HttpResponse, HttpTransport, Result, SmartTub, SmartTubConfig,
    SmartTubError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const AUTH_URL: &str = "https://auth.test/oauth/token";
pub const API_BASE: &str = "https://api.test";
pub const ACCOUNT_ID: &str = "account_id1";

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    routes: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            body: body.into(),
        });
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push(status, body.to_string());
    }

    /// Answer the next request for `url` with `body`, regardless of order
    pub fn route_json(&self, url: impl Into<String>, status: u16, body: Value) {
        self.routes.lock().unwrap().insert(
            url.into(),
            HttpResponse {
                status,
                body: body.to_string().into_bytes(),
            },
        );
    }

    pub fn push_empty(&self, status: u16) {
        self.push(status, Vec::new());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent after the first `skip`
    pub fn requests_after(&self, skip: usize) -> Vec<HttpRequest> {
        self.requests().into_iter().skip(skip).collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(response) = self.routes.lock().unwrap().remove(&request.url) {
            return Ok(response);
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SmartTubError::ApiError {
                status: None,
                detail: format!("no scripted response for {} {}", request.method, request.url),
            })
    }
}

/// Unsigned JWT carrying an `exp` claim `expires_in_secs` from now
pub fn access_token(expires_in_secs: i64) -> String {
    let exp = (Utc::now() + Duration::seconds(expires_in_secs)).timestamp();
    let header = BASE64_URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let claims = BASE64_URL_SAFE_NO_PAD.encode(
        json!({
            "exp": exp,
            "sub": "auth0|user",
            "http://operation-link.com/account_id": ACCOUNT_ID,
        })
        .to_string(),
    );
    format!("{header}.{claims}.signature")
}

pub fn token_response(expires_in_secs: i64) -> Value {
    json!({
        "access_token": access_token(expires_in_secs),
        "token_type": "Bearer",
        "refresh_token": "refresh1",
        "expires_in": 86400,
        "id_token": "ignored",
    })
}

/// Route library logs to the test harness output; set RUST_LOG to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config(convergence: Option<ConvergencePolicy>) -> SmartTubConfig {
    SmartTubConfig::default()
        .with_auth_url(AUTH_URL)
        .with_api_base(API_BASE)
        .with_convergence(convergence)
}

/// Client without convergence waiting, logged in with a token valid for an hour
pub async fn logged_in(transport: &Arc<ScriptedTransport>) -> SmartTub {
    logged_in_with(transport, None).await
}

pub async fn logged_in_with(
    transport: &Arc<ScriptedTransport>,
    convergence: Option<ConvergencePolicy>,
) -> SmartTub {
    init_tracing();
    let client = SmartTub::with_transport(config(convergence), transport.clone());
    transport.push_json(200, token_response(3600));
    client.login("user@example.com", "password").await.unwrap();
    client
}

pub fn url(path: &str) -> String {
    format!("{API_BASE}/{path}")
}

pub fn spa_document() -> Value {
    json!({
        "id": "id1",
        "brand": "Jacuzzi",
        "model": "J-335",
        "serialNumber": "ABC123",
    })
}

/// Status payload as reported by a real spa
pub fn status_document() -> Value {
    json!({
        "ambientTemperature": 65.6,
        "blowoutCycle": "INACTIVE",
        "cleanupCycle": "INACTIVE",
        "current": {"average": 0.0, "kwh": 0.213, "max": 0.0, "min": 0.0, "value": 0.0},
        "date": "2021-02-21",
        "demoMode": "DISABLED",
        "dipSwitches": 8,
        "displayTemperatureFormat": "FAHRENHEIT",
        "error": {"code": 0, "description": null, "title": "All Clear"},
        "errorCode": 0,
        "fieldsLastUpdated": {
            "cfstEvent": null,
            "errEvent": "2021-02-17T09:10:31.059Z",
            "heatMode": "2020-07-09T19:40:01.883Z",
            "setTemperature": "2021-02-20T03:10:00.525Z",
            "uv": "2021-02-21T18:48:34.699Z"
        },
        "flowSwitch": "OPEN",
        "heatMode": "AUTO",
        "heater": "OFF",
        "highTemperatureLimit": 36.1,
        "lastUpdated": "2021-02-21T21:32:36.215Z",
        "lights": null,
        "locks": {
            "access": "UNLOCKED",
            "maintenance": "UNLOCKED",
            "spa": "UNLOCKED",
            "temperature": "UNLOCKED"
        },
        "online": true,
        "ozone": "OFF",
        "primaryFiltration": {
            "cycle": 1,
            "duration": 4,
            "lastUpdated": "2021-01-20T11:38:57.014Z",
            "mode": "NORMAL",
            "startHour": 2,
            "status": "INACTIVE"
        },
        "pumps": null,
        "secondaryFiltration": {
            "lastUpdated": "2020-07-09T19:39:52.961Z",
            "mode": "AWAY",
            "status": "INACTIVE"
        },
        "setTemperature": 38.3,
        "state": "NORMAL",
        "time": "14:45:00",
        "timeFormat": "HOURS_12",
        "timeSet": null,
        "timezone": null,
        "uv": "OFF",
        "uvOnDemand": "OFF",
        "versions": {"balboa": "1.06", "controller": "1.28", "jacuzziLink": "53"},
        "water": {
            "oxidationReductionPotential": 604,
            "ph": 7.01,
            "temperature": 38.3,
            "temperatureLastUpdated": "2021-02-21T16:40:10.054Z",
            "turbidity": 0.01
        },
        "watercare": null
    })
}

/// Full status: the status payload plus device arrays
pub fn full_status_document() -> Value {
    let mut status = status_document();
    let doc = status.as_object_mut().unwrap();
    doc.insert(
        "pumps".to_string(),
        json!([
            {"id": "CP", "speed": "ONE_SPEED", "state": "LOW", "type": "CIRCULATION"},
            {"id": "P1", "speed": "TWO_SPEED", "state": "OFF", "type": "JET"}
        ]),
    );
    doc.insert(
        "lights".to_string(),
        json!([
            {"color": {"blue": 0, "green": 0, "red": 0, "white": 0}, "intensity": 0, "mode": "OFF", "zone": 1}
        ]),
    );
    doc.insert(
        "sensors".to_string(),
        json!([
            {
                "address": "aa:bb:cc:dd:ee:ff",
                "name": "{cover-sensor-1}",
                "type": "ibs0x",
                "subType": "magnet",
                "magnet": true,
                "motionSensor": false,
                "pressureSensor": null,
                "batteryLevel": 0.95,
                "rssi": -69,
                "lastUpdated": "2021-02-21T21:30:00.000Z"
            }
        ]),
    );
    status
}

/// Apply `edit` to a copy of `doc`
pub fn with(mut doc: Value, edit: impl FnOnce(&mut serde_json::Map<String, Value>)) -> Value {
    edit(doc.as_object_mut().unwrap());
    doc
}
