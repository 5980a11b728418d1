//! `ClimIA` - historical-trend weather forecasts
//!
//! Answers "what is the weather in a city on a date, or over a range of dates":
//! recorded measurements for past days, and for today onwards an estimate
//! extrapolated from the same calendar day over the previous years.

pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod logging;
pub mod models;
pub mod request;
pub mod source;
pub mod store;
pub mod web;

// Re-export core types for public API
pub use crate::config::ClimiaConfig;
pub use error::{ClimiaError, ErrorCode, ForecastError};
pub use forecast::ForecastService;
pub use models::{
    DailyForecast, ForecastOutcome, ForecastRequest, Location, Measurement, YearlyAggregate,
};
pub use request::ForecastQuery;
pub use source::{ExactMeasurementSource, HistoricalRecordSource, InMemorySource};
pub use store::MeasurementStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
