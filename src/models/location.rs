//! Location model and calendar-day key

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A city within a state, the partition all historical data is kept under
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// City name as stored by the data source
    pub city: String,
    /// Short regional code (e.g. "SP")
    pub state: String,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    /// Key prefix under which this location's measurements are stored.
    ///
    /// `#` separates key components, so it is escaped inside city and state.
    #[must_use]
    pub fn store_prefix(&self) -> String {
        format!(
            "CITY#{}#{}#",
            escape_key_component(&self.city),
            escape_key_component(&self.state)
        )
    }

    /// Generate the store key for one recorded date
    #[must_use]
    pub fn store_key(&self, date: NaiveDate) -> String {
        format!("{}DATE#{}", self.store_prefix(), date.format("%Y-%m-%d"))
    }
}

/// Percent-escape `%` and `#` so distinct components always give distinct keys
fn escape_key_component(value: &str) -> String {
    value.replace('%', "%25").replace('#', "%23")
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.city, self.state)
    }
}

/// Day of month and month, ignoring the year
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDay {
    pub month: u32,
    pub day: u32,
}

impl CalendarDay {
    #[must_use]
    pub fn new(day: u32, month: u32) -> Self {
        Self { month, day }
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.day(), date.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_key() {
        let location = Location::new("Campinas", "SP");
        let date = NaiveDate::from_ymd_opt(2023, 2, 7).unwrap();
        assert_eq!(location.store_key(date), "CITY#Campinas#SP#DATE#2023-02-07");
        assert!(location.store_key(date).starts_with(&location.store_prefix()));
    }

    #[test]
    fn test_store_prefix_does_not_overlap_similar_city() {
        let short = Location::new("Rio", "RJ");
        let long = Location::new("Rio Claro", "SP");
        assert!(!long.store_prefix().starts_with(&short.store_prefix()));
    }

    #[test]
    fn test_separator_in_state_does_not_extend_prefix() {
        let rio = Location::new("Rio", "RJ");
        let tricky = Location::new("Rio", "RJ#X");
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(!tricky.store_key(date).starts_with(&rio.store_prefix()));
    }

    #[test]
    fn test_separator_position_gives_distinct_keys() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = Location::new("A#B", "C");
        let b = Location::new("A", "B#C");
        assert_ne!(a.store_key(date), b.store_key(date));
        assert_eq!(a.store_key(date), "CITY#A%23B#C#DATE#2024-01-01");
        assert_ne!(
            Location::new("A%23B", "C").store_key(date),
            a.store_key(date)
        );
    }

    #[test]
    fn test_calendar_day_ignores_year() {
        let a = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(CalendarDay::of(a), CalendarDay::of(b));
        assert_eq!(CalendarDay::of(a), CalendarDay::new(31, 12));
    }
}
