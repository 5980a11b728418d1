//! Recorded measurements and the yearly aggregates derived from them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CalendarDay;

/// One recorded day at a location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Measurement {
    pub date: NaiveDate,
    /// Minimum temperature in Celsius
    pub min: f64,
    /// Mean temperature in Celsius
    pub mean: f64,
    /// Maximum temperature in Celsius
    pub max: f64,
    /// Precipitation amount in mm
    pub precip: f64,
}

/// One historical year's averages for one calendar day at one location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct YearlyAggregate {
    pub calendar_day: CalendarDay,
    pub year: i32,
    pub avg_min: f64,
    pub avg_mean: f64,
    pub avg_max: f64,
    pub avg_precip: f64,
}
