//! Request validation and date parsing
//!
//! Turns the loosely typed query a caller sends into a [`ForecastRequest`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;
use crate::models::{ForecastRequest, Location};

/// Date format accepted for every date field
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw forecast query as received from a caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Trimmed value of an optional field, `None` when absent or blank
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a `YYYY-MM-DD` date, naming `field` on failure
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ForecastError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ForecastError::invalid_date(field, value))
}

impl ForecastQuery {
    /// Validate the query.
    ///
    /// A non-empty `date` selects a single day even when range fields are also
    /// given; otherwise both `start_date` and `end_date` are required.
    pub fn validate(&self) -> Result<ForecastRequest, ForecastError> {
        let location = self.location()?;

        if let Some(date) = present(&self.date) {
            return Ok(ForecastRequest::Single {
                location,
                date: parse_date("date", date)?,
            });
        }

        match (present(&self.start_date), present(&self.end_date)) {
            (Some(start), Some(end)) => {
                let start = parse_date("start_date", start)?;
                let end = parse_date("end_date", end)?;
                if start > end {
                    return Err(ForecastError::invalid_request(format!(
                        "start_date {start} is after end_date {end}"
                    )));
                }
                Ok(ForecastRequest::Range {
                    location,
                    start,
                    end,
                })
            }
            _ => Err(ForecastError::MissingDateSelector),
        }
    }

    fn location(&self) -> Result<Location, ForecastError> {
        match (present(&self.city), present(&self.state)) {
            (Some(city), Some(state)) => Ok(Location::new(city, state)),
            _ => Err(ForecastError::invalid_request("city and state are required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn query(date: &str, start: &str, end: &str) -> ForecastQuery {
        ForecastQuery {
            city: Some("Campinas".into()),
            state: Some("SP".into()),
            date: Some(date.into()),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_date() {
        let request = query("2025-02-03", "", "").validate().unwrap();
        assert_eq!(
            request,
            ForecastRequest::Single {
                location: Location::new("Campinas", "SP"),
                date: ymd(2025, 2, 3),
            }
        );
    }

    #[test]
    fn test_single_date_wins_over_range() {
        let request = query("2025-02-03", "2025-01-01", "2025-01-31").validate().unwrap();
        assert!(matches!(request, ForecastRequest::Single { .. }));
    }

    #[test]
    fn test_range() {
        let request = query("", "2025-01-01", "2025-01-31").validate().unwrap();
        assert_eq!(
            request,
            ForecastRequest::Range {
                location: Location::new("Campinas", "SP"),
                start: ymd(2025, 1, 1),
                end: ymd(2025, 1, 31),
            }
        );
    }

    #[rstest]
    #[case::all_empty("", "", "")]
    #[case::only_start("", "2025-01-01", "")]
    #[case::only_end("", "", "2025-01-31")]
    fn test_missing_date_selector(#[case] date: &str, #[case] start: &str, #[case] end: &str) {
        assert_eq!(
            query(date, start, end).validate().unwrap_err(),
            ForecastError::MissingDateSelector
        );
    }

    #[test]
    fn test_absent_fields_are_missing_selector() {
        let q = ForecastQuery {
            city: Some("Campinas".into()),
            state: Some("SP".into()),
            ..Default::default()
        };
        assert_eq!(q.validate().unwrap_err(), ForecastError::MissingDateSelector);
    }

    #[rstest]
    #[case::bad_single("03/02/2025", "", "", "date")]
    #[case::bad_start("", "2025-1-32", "2025-02-01", "start_date")]
    #[case::bad_end("", "2025-01-01", "tomorrow", "end_date")]
    fn test_invalid_date_names_field(
        #[case] date: &str,
        #[case] start: &str,
        #[case] end: &str,
        #[case] field: &str,
    ) {
        match query(date, start, end).validate().unwrap_err() {
            ForecastError::InvalidDateFormat { field: got, .. } => assert_eq!(got, field),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case::no_city(None, Some("SP"))]
    #[case::blank_city(Some("  "), Some("SP"))]
    #[case::no_state(Some("Campinas"), None)]
    fn test_location_required(#[case] city: Option<&str>, #[case] state: Option<&str>) {
        let mut q = query("2025-02-03", "", "");
        q.city = city.map(String::from);
        q.state = state.map(String::from);
        assert!(matches!(
            q.validate().unwrap_err(),
            ForecastError::InvalidRequest { .. }
        ));
    }

    #[test]
    fn test_location_checked_before_dates() {
        let mut q = query("", "", "");
        q.city = None;
        assert!(matches!(
            q.validate().unwrap_err(),
            ForecastError::InvalidRequest { .. }
        ));
    }

    #[test]
    fn test_reversed_range() {
        let err = query("", "2025-02-01", "2025-01-01").validate().unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRequest { .. }));
    }

    #[test]
    fn test_fields_are_trimmed() {
        let mut q = query(" 2025-02-03 ", "", "");
        q.city = Some(" Campinas ".into());
        let request = q.validate().unwrap();
        assert_eq!(request.location().city, "Campinas");
    }
}
