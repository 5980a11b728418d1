//! Forecast service
//!
//! Answers a validated request by routing each day either to the recorded
//! measurement (days before today) or to a trend estimate (today and later),
//! expanding ranges one day at a time.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use super::compose;
use crate::error::ForecastError;
use crate::models::{
    CalendarDay, DailyForecast, ForecastOutcome, ForecastRequest, Location, YearlyAggregate,
};
use crate::source::{ExactMeasurementSource, HistoricalRecordSource};

/// Per-request state: the location, the day considered "today", and the
/// location's history once something has needed it
struct RequestScope<'a> {
    location: &'a Location,
    today: NaiveDate,
    history: OnceCell<Vec<YearlyAggregate>>,
}

impl<'a> RequestScope<'a> {
    fn new(location: &'a Location, today: NaiveDate) -> Self {
        Self {
            location,
            today,
            history: OnceCell::new(),
        }
    }
}

/// Stateless forecast engine over two read-only sources
#[derive(Clone)]
pub struct ForecastService {
    history: Arc<dyn HistoricalRecordSource>,
    measurements: Arc<dyn ExactMeasurementSource>,
    timezone: Tz,
}

impl ForecastService {
    pub fn new(
        history: Arc<dyn HistoricalRecordSource>,
        measurements: Arc<dyn ExactMeasurementSource>,
        timezone: Tz,
    ) -> Self {
        Self {
            history,
            measurements,
            timezone,
        }
    }

    /// Build a service whose two sources are the same backend
    pub fn from_source<S>(source: Arc<S>, timezone: Tz) -> Self
    where
        S: HistoricalRecordSource + ExactMeasurementSource + 'static,
    {
        Self::new(source.clone(), source, timezone)
    }

    /// Current date in the configured timezone
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Answer a request, evaluating "today" once for the whole request
    pub async fn get_forecast(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastOutcome, ForecastError> {
        self.get_forecast_at(request, self.today()).await
    }

    /// Answer a request as if the current date were `today`
    #[instrument(skip(self), fields(location = %request.location()))]
    pub async fn get_forecast_at(
        &self,
        request: &ForecastRequest,
        today: NaiveDate,
    ) -> Result<ForecastOutcome, ForecastError> {
        let scope = RequestScope::new(request.location(), today);
        match request {
            ForecastRequest::Single { date, .. } => {
                self.forecast_day(&scope, *date).await.map(ForecastOutcome::Single)
            }
            ForecastRequest::Range { start, end, .. } => {
                self.expand_range(&scope, *start, *end).await.map(ForecastOutcome::Range)
            }
        }
    }

    /// Walk `start..=end` one day at a time, leaving out days without data
    async fn expand_range(
        &self,
        scope: &RequestScope<'_>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyForecast>, ForecastError> {
        let mut days = Vec::new();

        for date in start.iter_days().take_while(|date| *date <= end) {
            match self.forecast_day(scope, date).await {
                Ok(day) => days.push(day),
                Err(err) if err.is_day_gap() => {
                    debug!(%date, "Skipping day without data: {}", err);
                }
                Err(err) => return Err(err),
            }
        }

        if days.is_empty() {
            return Err(ForecastError::NoDataInRange);
        }

        info!(
            "Produced {} of {} days for {}",
            days.len(),
            (end - start).num_days() + 1,
            scope.location
        );
        Ok(days)
    }

    /// Recorded measurement before today, trend estimate from today on
    async fn forecast_day(
        &self,
        scope: &RequestScope<'_>,
        date: NaiveDate,
    ) -> Result<DailyForecast, ForecastError> {
        if date < scope.today {
            self.recorded_day(scope.location, date).await
        } else {
            self.estimated_day(scope, date).await
        }
    }

    async fn recorded_day(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<DailyForecast, ForecastError> {
        let measurement = self
            .measurements
            .fetch_exact_measurement(location, date)
            .await?
            .ok_or(ForecastError::NotFound { date })?;

        Ok(DailyForecast::from_measurement(location.clone(), measurement))
    }

    async fn estimated_day(
        &self,
        scope: &RequestScope<'_>,
        date: NaiveDate,
    ) -> Result<DailyForecast, ForecastError> {
        let history = scope
            .history
            .get_or_try_init(|| async {
                let aggregates = self
                    .history
                    .fetch_historical_aggregates(scope.location, scope.today)
                    .await?;
                debug!("Loaded {} yearly aggregates for {}", aggregates.len(), scope.location);
                Ok::<_, ForecastError>(aggregates)
            })
            .await?;

        let calendar_day = CalendarDay::of(date);
        let same_day: Vec<YearlyAggregate> = history
            .iter()
            .filter(|a| a.calendar_day == calendar_day)
            .cloned()
            .collect();

        let estimate = compose(&same_day, date)?;
        debug!(
            %date,
            years = same_day.len(),
            target_year = date.year(),
            "Estimated day from history"
        );

        Ok(DailyForecast {
            location: scope.location.clone(),
            date,
            min: estimate.min,
            mean: estimate.mean,
            max: estimate.max,
            precip: estimate.precip,
        })
    }
}
