//! Persistent measurement store
//!
//! Measurements live in a fjall keyspace, one postcard-encoded record per
//! location and date under `CITY#<city>#<state>#DATE#<YYYY-MM-DD>`. Dates
//! sort lexicographically inside a location, so date windows are key ranges.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, info, instrument};

use crate::error::{ClimiaError, ForecastError};
use crate::models::{Location, Measurement, YearlyAggregate};
use crate::source::{
    ExactMeasurementSource, HistoricalRecordSource, aggregate_by_calendar_day, lookback_start,
};

/// Value stored per key; the location is repeated so scans can recover it
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    city: String,
    state: String,
    measurement: Measurement,
}

/// One measurement as found in a JSON import file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub city: String,
    pub state: String,
    pub date: NaiveDate,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub precip: f64,
}

impl MeasurementRecord {
    fn split(self) -> (Location, Measurement) {
        (
            Location::new(self.city, self.state),
            Measurement {
                date: self.date,
                min: self.min,
                mean: self.mean,
                max: self.max,
                precip: self.precip,
            },
        )
    }
}

#[derive(Clone)]
pub struct MeasurementStore {
    store: Keyspace,
}

fn storage_error(action: &str, err: fjall::Error) -> ClimiaError {
    ClimiaError::storage(format!("{action}: {err}"))
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    let value = store
        .get(key)
        .map_err(|e| storage_error("Failed to read measurement", e))?;
    Ok(value.map(|v| v.to_vec()))
}

fn insert_into_store(store: Keyspace, key: Vec<u8>, bytes: Vec<u8>) -> Result<()> {
    store
        .insert(key, bytes)
        .map_err(|e| storage_error("Failed to write measurement", e))?;
    Ok(())
}

fn scan_prefix(store: Keyspace, prefix: Vec<u8>) -> Result<Vec<Vec<u8>>> {
    let mut values = Vec::new();
    for item in store.prefix(prefix) {
        let (_, value) = item
            .into_inner()
            .map_err(|e| storage_error("Failed to scan measurements", e))?;
        values.push(value.to_vec());
    }
    Ok(values)
}

/// Values with keys in `[start, end)`
fn scan_range(store: Keyspace, start: Vec<u8>, end: Vec<u8>) -> Result<Vec<Vec<u8>>> {
    let mut values = Vec::new();
    for item in store.range(start..end) {
        let (_, value) = item
            .into_inner()
            .map_err(|e| storage_error("Failed to scan measurements", e))?;
        values.push(value.to_vec());
    }
    Ok(values)
}

fn decode(bytes: &[u8]) -> Result<StoredRecord> {
    postcard::from_bytes(bytes).context("Corrupt measurement record")
}

impl MeasurementStore {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path).open().map_err(|e| {
            storage_error(&format!("Failed to open store at {}", path.display()), e)
        })?;
        let items = db
            .keyspace("measurements", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| storage_error("Failed to open measurements keyspace", e))?;
        Ok(MeasurementStore { store: items })
    }

    /// Record a measurement, replacing any earlier one for the same date
    #[instrument(level = "debug", skip(self, measurement), fields(date = %measurement.date))]
    pub async fn put(&self, location: &Location, measurement: Measurement) -> Result<()> {
        let store = self.store.clone();
        let key = location.store_key(measurement.date).into_bytes();
        let record = StoredRecord {
            city: location.city.clone(),
            state: location.state.clone(),
            measurement,
        };
        let bytes = postcard::to_stdvec(&record)?;

        task::spawn_blocking(move || insert_into_store(store, key, bytes)).await??;
        Ok(())
    }

    /// The measurement recorded for exactly `date`, if any
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, location: &Location, date: NaiveDate) -> Result<Option<Measurement>> {
        let store = self.store.clone();
        let key = location.store_key(date).into_bytes();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key)).await??;
        match maybe_bytes {
            Some(bytes) => Ok(Some(decode(&bytes)?.measurement)),
            None => {
                debug!("No measurement stored");
                Ok(None)
            }
        }
    }

    /// Every measurement of a location, ascending by date
    pub async fn measurements(&self, location: &Location) -> Result<Vec<Measurement>> {
        let store = self.store.clone();
        let prefix = location.store_prefix().into_bytes();

        let values = task::spawn_blocking(move || scan_prefix(store, prefix)).await??;
        values
            .iter()
            .map(|bytes| decode(bytes).map(|record| record.measurement))
            .collect()
    }

    /// Measurements of a location dated in `[from, until)`, ascending by date
    pub async fn measurements_between(
        &self,
        location: &Location,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Measurement>> {
        if from >= until {
            return Ok(Vec::new());
        }
        let store = self.store.clone();
        let start = location.store_key(from).into_bytes();
        let end = location.store_key(until).into_bytes();

        let values = task::spawn_blocking(move || scan_range(store, start, end)).await??;
        values
            .iter()
            .map(|bytes| decode(bytes).map(|record| record.measurement))
            .collect()
    }

    /// Names of every city with measurements in `state`, sorted
    #[instrument(level = "debug", skip(self))]
    pub async fn cities_in_state(&self, state: &str) -> Result<Vec<String>> {
        let store = self.store.clone();

        let values = task::spawn_blocking(move || scan_prefix(store, b"CITY#".to_vec())).await??;
        let mut cities = BTreeSet::new();
        for bytes in &values {
            let record = decode(bytes)?;
            if record.state == state {
                cities.insert(record.city);
            }
        }
        Ok(cities.into_iter().collect())
    }

    /// Import a JSON array of measurement records, returning how many were stored
    pub async fn import_json(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(ClimiaError::from)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let records: Vec<MeasurementRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

        let count = records.len();
        for record in records {
            let (location, measurement) = record.split();
            self.put(&location, measurement).await?;
        }

        info!("Imported {} measurements from {}", count, path.display());
        Ok(count)
    }
}

#[async_trait]
impl HistoricalRecordSource for MeasurementStore {
    #[instrument(name = "historical_aggregates", skip(self, location), fields(location = %location))]
    async fn fetch_historical_aggregates(
        &self,
        location: &Location,
        today: NaiveDate,
    ) -> Result<Vec<YearlyAggregate>, ForecastError> {
        let measurements = self
            .measurements_between(location, lookback_start(today), today)
            .await?;
        debug!("Read {} measurements inside the lookback window", measurements.len());
        Ok(aggregate_by_calendar_day(&measurements, today))
    }
}

#[async_trait]
impl ExactMeasurementSource for MeasurementStore {
    async fn fetch_exact_measurement(
        &self,
        location: &Location,
        date: NaiveDate,
    ) -> Result<Option<Measurement>, ForecastError> {
        Ok(self.get(location, date).await?)
    }
}
