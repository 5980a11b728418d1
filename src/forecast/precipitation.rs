//! Trailing-window precipitation estimate

use super::PRECIPITATION_WINDOW;

/// Mean of the last `PRECIPITATION_WINDOW` values of a year-ascending series
#[must_use]
pub fn estimate(series: &[f64]) -> f64 {
    let window = &series[series.len().saturating_sub(PRECIPITATION_WINDOW)..];
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}
