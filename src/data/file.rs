//! Offline repository backed by a catalog CSV and an observations CSV.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::data::{Catalog, SeriesRepository};
use crate::domain::{CategoryPair, Observation, SeriesId, TimeSeries};
use crate::error::{AppError, RepositoryError};
use crate::io::ingest;

pub struct FileRepository {
    catalog: Catalog,
    series: HashMap<SeriesId, Vec<Observation>>,
}

impl FileRepository {
    pub fn open(catalog_path: &Path, observations_path: &Path) -> Result<Self, AppError> {
        let catalog = Catalog::from_path(catalog_path)?;
        let file = ingest::open_csv(observations_path, "observations CSV")?;
        Self::from_reader(catalog, file)
    }

    pub fn from_reader<R: Read>(catalog: Catalog, observations: R) -> Result<Self, AppError> {
        let ingested = ingest::read_observations(observations)?;
        for err in &ingested.row_errors {
            warn!(line = err.line, "skipping observation row: {}", err.message);
        }

        let mut series: HashMap<SeriesId, Vec<Observation>> = HashMap::new();
        for row in ingested.rows {
            series.entry(row.series_id).or_default().push(row.observation);
        }
        debug!(
            series = series.len(),
            rows_read = ingested.rows_read,
            "observations loaded"
        );

        Ok(Self { catalog, series })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl SeriesRepository for FileRepository {
    fn list_categories(&self) -> Result<Vec<CategoryPair>, RepositoryError> {
        Ok(self.catalog.categories())
    }

    fn resolve_series(&self, category_2: &str, category_3: Option<&str>) -> Result<Vec<SeriesId>, RepositoryError> {
        Ok(self.catalog.resolve(category_2, category_3))
    }

    fn fetch_series(&self, series_id: &SeriesId) -> Result<TimeSeries, RepositoryError> {
        Ok(self
            .series
            .get(series_id)
            .map(|obs| TimeSeries::new(obs.clone()))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn fetch_groups_rows_by_series() {
        let catalog = Catalog::from_reader(
            "category_2,category_3,series_id\nMetals,Steel,S1\nEnergy,Oil,O1\n".as_bytes(),
        )
        .unwrap();
        let obs = "series_id,observation_date,value\n\
                   S1,2021-02-01,12\n\
                   O1,2021-01-01,20\n\
                   S1,2021-01-01,10\n";
        let repo = FileRepository::from_reader(catalog, obs.as_bytes()).unwrap();

        let steel = repo.fetch_series(&SeriesId::from("S1")).unwrap();
        assert_eq!(steel.len(), 2);
        assert_eq!(steel.first_date(), NaiveDate::from_ymd_opt(2021, 1, 1));
        assert!(repo.fetch_series(&SeriesId::from("missing")).unwrap().is_empty());
        assert_eq!(repo.resolve_series("Energy", Some("Oil")).unwrap(), vec![SeriesId::from("O1")]);
    }
}
