//! Reporting utilities: the combined constituent table and terminal output.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CompositeResult, TimeSeries};
use crate::engine::DisplayWindow;

pub mod format;

pub use format::*;

/// Composite and constituents outer-joined on date.
///
/// One column per distinct label; when two constituents share a label, the
/// first one keeps the column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterTable {
    pub labels: Vec<String>,
    pub rows: Vec<MasterRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterRow {
    pub observation_date: NaiveDate,
    pub composite: Option<f64>,
    pub values: Vec<Option<f64>>,
}

impl MasterTable {
    pub fn build(result: &CompositeResult) -> Self {
        let mut labels: Vec<String> = Vec::new();
        let mut columns: Vec<&TimeSeries> = Vec::new();
        for (label, series) in result.labels.iter().zip(&result.individual) {
            if labels.contains(label) {
                continue;
            }
            labels.push(label.clone());
            columns.push(series);
        }

        let dates: BTreeSet<NaiveDate> = result
            .composite
            .iter()
            .chain(columns.iter().flat_map(|s| s.iter()))
            .map(|o| o.observation_date)
            .collect();

        let rows = dates
            .into_iter()
            .map(|date| MasterRow {
                observation_date: date,
                composite: result.composite.value_on(date),
                values: columns.iter().map(|s| s.value_on(date)).collect(),
            })
            .collect();

        Self { labels, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows inside `window` (all rows when `None`).
    pub fn rows_in(&self, window: Option<&DisplayWindow>) -> &[MasterRow] {
        let Some(window) = window else {
            return &self.rows;
        };
        let idx = self.rows.partition_point(|r| !window.contains(r.observation_date));
        &self.rows[idx..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesId;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn result() -> CompositeResult {
        CompositeResult {
            composite: TimeSeries::from_pairs(vec![(d(2020, 1), 5.0), (d(2020, 2), 11.0), (d(2020, 3), 15.0)]),
            individual: vec![
                TimeSeries::from_pairs(vec![(d(2020, 1), 10.0), (d(2020, 2), 12.0)]),
                TimeSeries::from_pairs(vec![(d(2020, 2), 10.0), (d(2020, 3), 30.0)]),
                TimeSeries::from_pairs(vec![(d(2020, 1), 99.0)]),
            ],
            labels: vec!["Steel".into(), "Oil".into(), "Steel".into()],
            series_ids: vec![SeriesId::from("a"), SeriesId::from("b"), SeriesId::from("c")],
            weights: vec![50.0, 50.0, 0.0],
        }
    }

    #[test]
    fn duplicate_labels_keep_first_column() {
        let table = MasterTable::build(&result());
        assert_eq!(table.labels, vec!["Steel", "Oil"]);
        assert_eq!(table.rows[0].values, vec![Some(10.0), None]);
    }

    #[test]
    fn rows_cover_union_of_dates() {
        let table = MasterTable::build(&result());
        let dates: Vec<NaiveDate> = table.rows.iter().map(|r| r.observation_date).collect();
        assert_eq!(dates, vec![d(2020, 1), d(2020, 2), d(2020, 3)]);
        assert_eq!(table.rows[2].values, vec![None, Some(30.0)]);
        assert_eq!(table.rows[1].composite, Some(11.0));
    }

    #[test]
    fn window_trims_leading_rows() {
        let table = MasterTable::build(&result());
        let window = DisplayWindow::starting_at(d(2020, 2));
        assert_eq!(table.rows_in(Some(&window)).len(), 2);
        assert_eq!(table.rows_in(None).len(), 3);
    }
}
