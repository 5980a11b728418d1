//! Data sources the forecast engine reads from
//!
//! The engine only needs two read capabilities: the per-calendar-day aggregates of
//! the last years at a location, and the exact measurement of one past day.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};

use crate::error::ForecastError;
use crate::forecast::LOOKBACK_YEARS;
use crate::models::{CalendarDay, Location, Measurement, YearlyAggregate};

/// Provides yearly aggregates per calendar day for the years before `today`
#[async_trait]
pub trait HistoricalRecordSource: Send + Sync {
    /// Aggregates of every calendar day with data in `[today - LOOKBACK_YEARS, today)`.
    /// No ordering is guaranteed.
    async fn fetch_historical_aggregates(
        &self,
        location: &Location,
        today: NaiveDate,
    ) -> Result<Vec<YearlyAggregate>, ForecastError>;
}

/// Provides the recorded measurement of one exact day
#[async_trait]
pub trait ExactMeasurementSource: Send + Sync {
    async fn fetch_exact_measurement(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<Option<Measurement>, ForecastError>;
}

/// First day of the lookback window ending the day before `today`
#[must_use]
pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(12 * LOOKBACK_YEARS))
        .unwrap_or(NaiveDate::MIN)
}

#[derive(Default)]
struct Sums {
    count: u32,
    min: f64,
    mean: f64,
    max: f64,
    precip: f64,
}

/// Average measurements inside the lookback window per (year, month, day).
///
/// Groups come back ordered by year, then month, then day.
pub fn aggregate_by_calendar_day<'a>(
    measurements: impl IntoIterator<Item = &'a Measurement>,
    today: NaiveDate,
) -> Vec<YearlyAggregate> {
    let start = lookback_start(today);
    let mut groups: BTreeMap<(i32, CalendarDay), Sums> = BTreeMap::new();

    for m in measurements
        .into_iter()
        .filter(|m| m.date >= start && m.date < today)
    {
        let sums = groups
            .entry((m.date.year(), CalendarDay::of(m.date)))
            .or_default();
        sums.count += 1;
        sums.min += m.min;
        sums.mean += m.mean;
        sums.max += m.max;
        sums.precip += m.precip;
    }

    groups
        .into_iter()
        .map(|((year, calendar_day), sums)| {
            let n = f64::from(sums.count);
            YearlyAggregate {
                calendar_day,
                year,
                avg_min: sums.min / n,
                avg_mean: sums.mean / n,
                avg_max: sums.max / n,
                avg_precip: sums.precip / n,
            }
        })
        .collect()
}

/// Measurements held in memory, keyed by location.
///
/// Several measurements for the same date are kept and averaged into one
/// aggregate; the exact lookup returns the first one recorded.
#[derive(Debug, Default, Clone)]
pub struct InMemorySource {
    measurements: HashMap<Location, BTreeMap<NaiveDate, Vec<Measurement>>>,
}

impl InMemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: Location, measurement: Measurement) {
        self.measurements
            .entry(location)
            .or_default()
            .entry(measurement.date)
            .or_default()
            .push(measurement);
    }

    #[must_use]
    pub fn with_measurement(mut self, location: &Location, measurement: Measurement) -> Self {
        self.insert(location.clone(), measurement);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.measurements
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistoricalRecordSource for InMemorySource {
    async fn fetch_historical_aggregates(
        &self,
        location: &Location,
        today: NaiveDate,
    ) -> Result<Vec<YearlyAggregate>, ForecastError> {
        let Some(by_date) = self.measurements.get(location) else {
            return Ok(Vec::new());
        };
        Ok(aggregate_by_calendar_day(by_date.values().flatten(), today))
    }
}

#[async_trait]
impl ExactMeasurementSource for InMemorySource {
    async fn fetch_exact_measurement(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<Option<Measurement>, ForecastError> {
        Ok(self
            .measurements
            .get(location)
            .and_then(|by_date| by_date.get(&date))
            .and_then(|day| day.first())
            .cloned())
    }
}
