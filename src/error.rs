//! Error types and handling for the `ClimIA` forecast service

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Failures produced while answering a forecast request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// City or state missing, or an otherwise malformed request
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// A date field could not be parsed as `YYYY-MM-DD`
    #[error("Invalid date format for '{field}': expected YYYY-MM-DD, got '{value}'")]
    InvalidDateFormat { field: String, value: String },

    /// Neither a single date nor a complete date range was supplied
    #[error("A date or a start_date/end_date range must be provided")]
    MissingDateSelector,

    /// No recorded measurement exists for a past date
    #[error("No measurement recorded for {date}")]
    NotFound { date: NaiveDate },

    /// No historical aggregates exist for the requested calendar day
    #[error("No historical data for day {day:02}/{month:02}")]
    NoHistoricalData { day: u32, month: u32 },

    /// Every day of a range came back empty
    #[error("No data found in the requested range")]
    NoDataInRange,

    /// A data source failed while being queried
    #[error("Data source error: {message}")]
    Source { message: String },
}

impl ForecastError {
    /// Create a new invalid request error
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a new date format error for the named field
    pub fn invalid_date<F: Into<String>, V: Into<String>>(field: F, value: V) -> Self {
        Self::InvalidDateFormat {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new data source error
    pub fn source_error<S: Into<String>>(message: S) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Whether a range request may skip the day that produced this error
    #[must_use]
    pub fn is_day_gap(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::NoHistoricalData { .. })
    }

    /// Stable code for API error bodies
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::InvalidDateFormat { .. } => ErrorCode::InvalidDateFormat,
            Self::MissingDateSelector => ErrorCode::MissingDateSelector,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::NoHistoricalData { .. } => ErrorCode::NoHistoricalData,
            Self::NoDataInRange => ErrorCode::NoDataInRange,
            Self::Source { .. } => ErrorCode::SourceUnavailable,
        }
    }
}

impl From<anyhow::Error> for ForecastError {
    fn from(err: anyhow::Error) -> Self {
        ForecastError::source_error(format!("{err:#}"))
    }
}

/// Machine readable error identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidDateFormat,
    MissingDateSelector,
    NotFound,
    NoHistoricalData,
    NoDataInRange,
    SourceUnavailable,
    Unauthorized,
}

/// Application level errors outside of a single forecast request
#[derive(Error, Debug)]
pub enum ClimiaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Measurement store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ClimiaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClimiaError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            ClimiaError::Storage { .. } => {
                "Measurement store failed. Check the storage path and its permissions.".to_string()
            }
            ClimiaError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ForecastError::invalid_request("city is required");
        assert!(matches!(err, ForecastError::InvalidRequest { .. }));

        let err = ForecastError::invalid_date("start_date", "2024/01/01");
        assert!(err.to_string().contains("start_date"));
        assert!(err.to_string().contains("2024/01/01"));
    }

    #[test]
    fn test_day_gaps() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(ForecastError::NotFound { date }.is_day_gap());
        assert!(ForecastError::NoHistoricalData { day: 1, month: 3 }.is_day_gap());
        assert!(!ForecastError::NoDataInRange.is_day_gap());
        assert!(!ForecastError::source_error("disk gone").is_day_gap());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ForecastError::MissingDateSelector.code(), ErrorCode::MissingDateSelector);
        assert_eq!(
            serde_json::to_string(&ErrorCode::NoDataInRange).unwrap(),
            "\"NO_DATA_IN_RANGE\""
        );
    }

    #[test]
    fn test_user_messages() {
        let config_err = ClimiaError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let storage_err = ClimiaError::storage("test");
        assert!(storage_err.user_message().contains("Measurement store"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClimiaError = io_err.into();
        assert!(matches!(err, ClimiaError::Io { .. }));
    }
}
