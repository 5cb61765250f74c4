//! In-memory repository.
//!
//! Records every `fetch_series` call so callers can check which identifiers
//! were actually fetched.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::data::SeriesRepository;
use crate::domain::{CategoryPair, SeriesId, TimeSeries};
use crate::error::RepositoryError;

#[derive(Default)]
pub struct InMemoryRepository {
    mappings: Vec<(CategoryPair, SeriesId)>,
    series: HashMap<SeriesId, TimeSeries>,
    resolve_failures: HashMap<CategoryPair, RepositoryError>,
    fetch_failures: HashMap<SeriesId, RepositoryError>,
    fetched: Mutex<Vec<SeriesId>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a category pair to a series and store its data.
    pub fn with_series(
        mut self,
        category_2: &str,
        category_3: &str,
        series_id: &str,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let id = SeriesId::new(series_id);
        self.mappings.push((CategoryPair::new(category_2, category_3), id.clone()));
        self.series.insert(id, TimeSeries::from_pairs(points));
        self
    }

    /// Map a category pair to a series identifier without storing any data.
    pub fn with_mapping(mut self, category_2: &str, category_3: &str, series_id: &str) -> Self {
        self.mappings
            .push((CategoryPair::new(category_2, category_3), SeriesId::new(series_id)));
        self
    }

    pub fn failing_resolve(mut self, category_2: &str, category_3: &str, err: RepositoryError) -> Self {
        self.resolve_failures
            .insert(CategoryPair::new(category_2, category_3), err);
        self
    }

    pub fn failing_fetch(mut self, series_id: &str, err: RepositoryError) -> Self {
        self.fetch_failures.insert(SeriesId::new(series_id), err);
        self
    }

    /// Identifiers passed to `fetch_series`, in call order.
    pub fn fetched(&self) -> Vec<SeriesId> {
        match self.fetched.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SeriesRepository for InMemoryRepository {
    fn list_categories(&self) -> Result<Vec<CategoryPair>, RepositoryError> {
        Ok(self
            .mappings
            .iter()
            .map(|(pair, _)| pair.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }

    fn resolve_series(&self, category_2: &str, category_3: Option<&str>) -> Result<Vec<SeriesId>, RepositoryError> {
        if let Some(c3) = category_3 {
            if let Some(err) = self.resolve_failures.get(&CategoryPair::new(category_2, c3)) {
                return Err(err.clone());
            }
        }
        Ok(self
            .mappings
            .iter()
            .filter(|(pair, _)| pair.category_2 == category_2)
            .filter(|(pair, _)| category_3.is_none_or(|c3| pair.category_3 == c3))
            .map(|(_, id)| id.clone())
            .collect())
    }

    fn fetch_series(&self, series_id: &SeriesId) -> Result<TimeSeries, RepositoryError> {
        match self.fetched.lock() {
            Ok(mut log) => log.push(series_id.clone()),
            Err(poisoned) => poisoned.into_inner().push(series_id.clone()),
        }
        if let Some(err) = self.fetch_failures.get(series_id) {
            return Err(err.clone());
        }
        Ok(self.series.get(series_id).cloned().unwrap_or_default())
    }
}
