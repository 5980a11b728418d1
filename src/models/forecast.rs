//! Forecast requests and results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Location, Measurement};

/// A validated request into the forecast engine
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastRequest {
    Single {
        location: Location,
        date: NaiveDate,
    },
    /// Inclusive range, `start <= end`
    Range {
        location: Location,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl ForecastRequest {
    #[must_use]
    pub fn location(&self) -> &Location {
        match self {
            Self::Single { location, .. } | Self::Range { location, .. } => location,
        }
    }
}

/// Weather for one day at one location, recorded or estimated
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyForecast {
    #[serde(flatten)]
    pub location: Location,
    pub date: NaiveDate,
    #[serde(rename = "temperature_min")]
    pub min: f64,
    #[serde(rename = "temperature_mean")]
    pub mean: f64,
    #[serde(rename = "temperature_max")]
    pub max: f64,
    #[serde(rename = "precipitation")]
    pub precip: f64,
}

impl DailyForecast {
    /// Report a recorded measurement as-is
    #[must_use]
    pub fn from_measurement(location: Location, measurement: Measurement) -> Self {
        Self {
            location,
            date: measurement.date,
            min: measurement.min,
            mean: measurement.mean,
            max: measurement.max,
            precip: measurement.precip,
        }
    }
}

/// Result of a forecast request, one entry per request shape
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Single(DailyForecast),
    /// Ascending by date, gap days omitted, never empty
    Range(Vec<DailyForecast>),
}

impl ForecastOutcome {
    /// Flatten into the per-day results in ascending date order
    #[must_use]
    pub fn into_days(self) -> Vec<DailyForecast> {
        match self {
            Self::Single(day) => vec![day],
            Self::Range(days) => days,
        }
    }
}
