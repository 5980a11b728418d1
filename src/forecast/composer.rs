//! Single-day estimate from multi-year aggregates of one calendar day

use chrono::{Datelike, NaiveDate};

use super::{DECAY_RATE, precipitation, trend};
use crate::error::ForecastError;
use crate::models::{CalendarDay, YearlyAggregate};

/// Estimated statistics for one day, rounded to whole units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub precip: f64,
}

/// Extrapolate the aggregates of `target`'s calendar day to `target`'s year.
///
/// Each temperature statistic is projected from the most recent year along its
/// fitted trend, damped by `e^(-DECAY_RATE * years_ahead)`. Precipitation is the
/// trailing average of the most recent years and does not follow the trend.
pub fn compose(
    aggregates: &[YearlyAggregate],
    target: NaiveDate,
) -> Result<Estimate, ForecastError> {
    let Some(last_year) = aggregates.iter().map(|a| a.year).max() else {
        let day = CalendarDay::of(target);
        return Err(ForecastError::NoHistoricalData {
            day: day.day,
            month: day.month,
        });
    };

    let mut sorted = aggregates.to_vec();
    sorted.sort_by_key(|a| a.year);
    let last = &sorted[sorted.len() - 1];
    debug_assert_eq!(last.year, last_year);

    let years_ahead = target.year() - last_year;
    let project = |stat: fn(&YearlyAggregate) -> f64| {
        let slope = trend::fit(&trend::indexed(sorted.iter().map(stat)));
        extrapolate(stat(last), slope, years_ahead)
    };

    let min = project(|a| a.avg_min);
    let mean = project(|a| a.avg_mean);
    let max = project(|a| a.avg_max);

    let precip_series: Vec<f64> = sorted.iter().map(|a| a.avg_precip).collect();
    let precip = precipitation::estimate(&precip_series);

    Ok(Estimate {
        min: min.round(),
        mean: mean.round(),
        max: max.round(),
        precip: precip.round(),
    })
}

/// `base + slope * years * e^(-DECAY_RATE * years)`
#[must_use]
pub fn extrapolate(base: f64, slope: f64, years: i32) -> f64 {
    let years = f64::from(years);
    base + slope * years * (-DECAY_RATE * years).exp()
}
