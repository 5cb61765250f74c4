//! Trailing display window.
//!
//! The window is a view: it borrows a series and returns the tail slice, so
//! the full history stays available for re-queries with a wider span.

use chrono::{Months, NaiveDate};

use crate::domain::{Observation, TimeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    start: NaiveDate,
}

impl DisplayWindow {
    pub fn starting_at(start: NaiveDate) -> Self {
        Self { start }
    }

    /// Window covering `years` calendar years back from the last date of `series`.
    ///
    /// Subtraction is calendar aware (Feb 29 maps to Feb 28). Returns `None`
    /// for an empty series.
    pub fn trailing_years(series: &TimeSeries, years: u32) -> Option<Self> {
        let last = series.last_date()?;
        let start = last
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        Some(Self { start })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start
    }

    /// Rows with `observation_date >= start`.
    pub fn apply<'a>(&self, series: &'a TimeSeries) -> &'a [Observation] {
        let obs = series.observations();
        let idx = obs.partition_point(|o| o.observation_date < self.start);
        &obs[idx..]
    }
}
