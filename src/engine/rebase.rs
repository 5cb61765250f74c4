//! Rebase a series so its mean over a base year is 100.

use chrono::Datelike;

use crate::domain::TimeSeries;

/// Base value a rebased series averages to over its base year.
pub const REBASE_LEVEL: f64 = 100.0;

/// Rescale `series` so the mean of its `base_year` observations equals 100.
///
/// Returns `None` when the base year has no observations or its mean is zero
/// or non-finite.
pub fn rebase_to_year(series: &TimeSeries, base_year: i32) -> Option<TimeSeries> {
    let (sum, n) = series
        .iter()
        .filter(|o| o.observation_date.year() == base_year)
        .fold((0.0, 0usize), |(sum, n), o| (sum + o.value, n + 1));
    if n == 0 {
        return None;
    }
    let mean = sum / n as f64;
    if !mean.is_finite() || mean == 0.0 {
        return None;
    }
    Some(series.scaled(REBASE_LEVEL / mean))
}
