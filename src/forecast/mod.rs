//! Historical-trend forecast engine
//!
//! Estimates the weather of a day that has not been measured yet from the same
//! calendar day in previous years:
//! - Trend: least-squares slope of each temperature statistic across years
//! - Precipitation: trailing average of the most recent years
//! - Composer: extrapolates the last observed year to the target year
//! - Service: routes past days to recorded measurements and expands ranges

pub mod composer;
pub mod precipitation;
pub mod service;
pub mod trend;

pub use composer::{Estimate, compose};
pub use service::ForecastService;

/// Rate of the exponential decay applied to trend extrapolation, per year
pub const DECAY_RATE: f64 = 0.1;

/// Years of history, ending the day before today, used to build aggregates
pub const LOOKBACK_YEARS: u32 = 5;

/// Most recent years averaged for the precipitation estimate
pub const PRECIPITATION_WINDOW: usize = 3;
