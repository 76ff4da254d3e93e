//! Core library for the `weather-dash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - Query validation for the current, historical and marine units
//! - The fetch orchestrator and its transport seam
//! - Per-unit request state with stale-response fencing
//! - Pure rendering of request state into display panels
//!
//! It is used by `weather-dash`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod query;
pub mod render;
pub mod state;
pub mod unit;

pub use client::{HttpTransport, Transport, WeatherClient};
pub use config::{Config, Credential};
pub use dashboard::{Dashboard, Tab};
pub use error::{FetchError, TransportError, ValidationError};
pub use query::{CurrentQuery, HistoricalQuery, MarineQuery, Query};
pub use render::{View, render};
pub use state::RequestState;
pub use unit::{UnitKind, WeatherUnit};
