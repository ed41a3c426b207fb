//! Rust client library for SmartTub connected hot tubs
//!
//! This library provides an async API for the SmartTub cloud service. It supports:
//!
//! - Password login with transparent access token refresh
//! - Account and spa discovery
//! - Spa status, including water quality, filtration cycles and locks
//! - Heat mode, set temperature, display format and clock control
//! - Pumps, light zones, ClearRay, reminders, errors and sensors
//! - Waiting for a command's effect to show up in the reported state
//!
//! # Quick Start
//!
//! ```no_run
//! use smarttub::{HeatMode, LightMode, SmartTub};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SmartTub::new()?;
//!     client.login("user@example.com", "password").await?;
//!
//!     let account = client.get_account().await?;
//!     for spa in account.get_spas().await? {
//!         let status = spa.get_status_full().await?;
//!         println!("{}: water at {:?}", spa.name(), status.water.and_then(|w| w.temperature));
//!
//!         spa.set_heat_mode(HeatMode::Auto).await?;
//!         spa.set_temperature(38.5).await?;
//!
//!         if let Some(light) = status.lights.unwrap_or_default().first() {
//!             light.set_mode(LightMode::Purple, 50).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Waiting for commands
//!
//! The service accepts commands before the spa has applied them. By default
//! every mutating call polls the spa state until the change is visible,
//! failing with [`SmartTubError::ConvergenceTimeout`] if it never is. Set
//! [`SmartTubConfig::convergence`] to `None` to return as soon as a command
//! is accepted.
//!
//! # Architecture
//!
//! The library is organized into several layers:
//!
//! - **Client**: Session entry point and account access
//! - **Entities**: Account, spa, state and device objects
//! - **Decoding**: Tolerant mapping of vendor JSON onto typed fields
//! - **Connection**: Authenticated request pipeline
//! - **Auth**: Login and token refresh
//! - **Transport**: Pluggable HTTP layer, `reqwest` by default

mod account;
mod auth;
mod client;
mod config;
mod connection;
mod convergence;
mod error;
mod light;
mod property;
mod protocol;
mod pump;
mod reminder;
mod sensor;
mod spa;
mod state;
mod transport;
mod types;

// Public exports
pub use account::Account;
pub use auth::{decode_claims, Claims, Credentials};
pub use client::SmartTub;
pub use config::{ConvergencePolicy, SmartTubConfig};
pub use error::{Result, SmartTubError};
pub use light::{LightColor, SpaLight};
pub use property::{attribute_name, Properties};
pub use pump::SpaPump;
pub use reminder::{SpaError, SpaReminder};
pub use sensor::SpaSensor;
pub use spa::Spa;
pub use state::{
    SpaLock, SpaPrimaryFiltrationCycle, SpaSecondaryFiltrationCycle, SpaState, SpaWaterState,
    LOCKED, UNLOCKED,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{
    round_setpoint, AccountId, Celsius, CycleStatus, EnergyUsageInterval, HeatMode, LightMode,
    PrimaryFiltrationMode, PumpState, PumpType, SecondaryFiltrationMode, SpaId, TemperatureFormat,
    TimeFormat,
};
pub use reqwest::Method;
