//! Data models for the ClimIA forecast engine
//!
//! This module contains the core domain models organized by concern:
//! - Location: City/state partition key and calendar-day grouping
//! - Weather: Recorded measurements and yearly aggregates
//! - Forecast: Requests into the engine and the per-day results it returns

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{DailyForecast, ForecastOutcome, ForecastRequest};
pub use location::{CalendarDay, Location};
pub use weather::{Measurement, YearlyAggregate};
