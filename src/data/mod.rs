//! Series repositories: where category mappings and observations come from.
//!
//! The engine only depends on [`SeriesRepository`]. Backends:
//! - [`FileRepository`]: catalog CSV + local observations CSV
//! - [`FredRepository`]: catalog CSV + the FRED observations API
//! - [`InMemoryRepository`]: programmatic, used by tests and embedders

use crate::domain::{CategoryPair, SeriesId, TimeSeries};
use crate::error::RepositoryError;

pub mod catalog;
pub mod file;
pub mod fred;
pub mod memory;

pub use catalog::Catalog;
pub use file::FileRepository;
pub use fred::{FredClient, FredRepository};
pub use memory::InMemoryRepository;

/// Read-only access to a category catalog and the series behind it.
///
/// Implementations must be `Sync` so selections can be resolved in parallel.
pub trait SeriesRepository: Sync {
    /// All valid category pairs, ordered by `(category_2, category_3)`.
    fn list_categories(&self) -> Result<Vec<CategoryPair>, RepositoryError>;

    /// Series identifiers for a category, in repository order.
    ///
    /// When `category_3` is `None` every series under `category_2` matches.
    /// An empty list means "no match".
    fn resolve_series(&self, category_2: &str, category_3: Option<&str>) -> Result<Vec<SeriesId>, RepositoryError>;

    /// All observations for one series. Unknown identifiers yield an empty series.
    fn fetch_series(&self, series_id: &SeriesId) -> Result<TimeSeries, RepositoryError>;
}
