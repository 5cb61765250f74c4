//! Category catalog loaded from CSV.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::domain::{CategoryPair, SeriesId};
use crate::error::AppError;
use crate::io::ingest::{self, CatalogRow};

/// Flat `(category_2, category_3) -> series_id` mapping.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn from_rows(rows: Vec<CatalogRow>) -> Self {
        Self { rows }
    }

    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let file = ingest::open_csv(path, "catalog CSV")?;
        let catalog = Self::from_reader(file)?;
        if catalog.rows.is_empty() {
            return Err(AppError::new(
                2,
                format!("Catalog '{}' contains no usable rows.", path.display()),
            ));
        }
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let ingested = ingest::read_catalog(reader)?;
        for err in &ingested.row_errors {
            warn!(line = err.line, "skipping catalog row: {}", err.message);
        }
        debug!(
            rows_read = ingested.rows_read,
            rows_used = ingested.rows.len(),
            "catalog loaded"
        );
        Ok(Self { rows: ingested.rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct category pairs, sorted.
    pub fn categories(&self) -> Vec<CategoryPair> {
        self.rows
            .iter()
            .map(|row| row.pair.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct `category_3` values under one `category_2`, sorted.
    pub fn subcategories(&self, category_2: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.pair.category_2 == category_2)
            .map(|row| row.pair.category_3.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Matching series identifiers in file order, without duplicates.
    pub fn resolve(&self, category_2: &str, category_3: Option<&str>) -> Vec<SeriesId> {
        let mut out: Vec<SeriesId> = Vec::new();
        for row in &self.rows {
            if row.pair.category_2 != category_2 {
                continue;
            }
            if category_3.is_some_and(|c3| row.pair.category_3 != c3) {
                continue;
            }
            if !out.contains(&row.series_id) {
                out.push(row.series_id.clone());
            }
        }
        out
    }
}
