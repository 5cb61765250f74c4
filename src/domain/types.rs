//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - passed between the resolver, the aggregation engine, and the reports
//! - exported to JSON/CSV
//! - built directly by embedders without going through the CLI

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum number of selections accepted from a user in one computation.
pub const MAX_SELECTIONS: usize = 10;

/// Default trailing display window, in years.
pub const DEFAULT_WINDOW_YEARS: u32 = 5;

/// Tolerance used when checking whether selection weights add up to 100%.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// A two-level commodity classification key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryPair {
    pub category_2: String,
    pub category_3: String,
}

impl CategoryPair {
    pub fn new(category_2: impl Into<String>, category_3: impl Into<String>) -> Self {
        Self {
            category_2: category_2.into(),
            category_3: category_3.into(),
        }
    }
}

/// Opaque identifier of one time series in a repository.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(String);

impl SeriesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SeriesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One user-selected constituent of the composite.
///
/// The weight is a percentage in `[0, 100]`. Whether the pairing of
/// `category_2` and `category_3` exists in the catalog is not checked here;
/// an unknown pairing simply resolves to no series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    category_2: String,
    category_3: String,
    weight_percent: f64,
}

impl Selection {
    pub fn new(
        category_2: impl Into<String>,
        category_3: impl Into<String>,
        weight_percent: f64,
    ) -> Result<Self, AppError> {
        if !weight_percent.is_finite() || !(0.0..=100.0).contains(&weight_percent) {
            return Err(AppError::new(
                3,
                format!("Invalid weight {weight_percent}: must be a number between 0 and 100."),
            ));
        }
        let category_2 = category_2.into();
        let category_3 = category_3.into();
        if category_2.trim().is_empty() {
            return Err(AppError::new(3, "Selection is missing category_2."));
        }
        Ok(Self {
            category_2,
            category_3,
            weight_percent,
        })
    }

    pub fn category_2(&self) -> &str {
        &self.category_2
    }

    pub fn category_3(&self) -> &str {
        &self.category_3
    }

    pub fn weight_percent(&self) -> f64 {
        self.weight_percent
    }

    /// Weight as a multiplier (`weight_percent / 100`).
    pub fn weight_fraction(&self) -> f64 {
        self.weight_percent / 100.0
    }

    pub fn pair(&self) -> CategoryPair {
        CategoryPair::new(self.category_2.clone(), self.category_3.clone())
    }
}

/// Parses `CATEGORY_2:CATEGORY_3:WEIGHT`.
///
/// The last two colons are the separators, so `category_2` may itself contain
/// colons.
impl FromStr for Selection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(weight), Some(category_3), Some(category_2)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::new(
                3,
                format!("Invalid selection '{s}'. Expected CATEGORY_2:CATEGORY_3:WEIGHT."),
            ));
        };
        let weight = weight.trim().trim_end_matches('%').parse::<f64>().map_err(|_| {
            AppError::new(3, format!("Invalid weight '{weight}' in selection '{s}'."))
        })?;
        Selection::new(category_2.trim(), category_3.trim(), weight)
    }
}

/// The caller-owned list of selections for one computation.
///
/// An empty set is accepted and yields an empty composite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SelectionSet {
    selections: Vec<Selection>,
}

impl SelectionSet {
    pub fn new(selections: Vec<Selection>) -> Result<Self, AppError> {
        if selections.len() > MAX_SELECTIONS {
            return Err(AppError::new(
                3,
                format!(
                    "Too many selections: {} (at most {MAX_SELECTIONS} are allowed).",
                    selections.len()
                ),
            ));
        }
        Ok(Self { selections })
    }

    pub fn as_slice(&self) -> &[Selection] {
        &self.selections
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selection> {
        self.selections.iter()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.selections.iter().map(Selection::weight_percent).sum()
    }

    /// True when the weights add up to 100%.
    pub fn is_balanced(&self) -> bool {
        (self.total_weight() - 100.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Selection;
    type IntoIter = std::slice::Iter<'a, Selection>;

    fn into_iter(self) -> Self::IntoIter {
        self.selections.iter()
    }
}

/// A single dated value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub observation_date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(observation_date: NaiveDate, value: f64) -> Self {
        Self {
            observation_date,
            value,
        }
    }
}

/// An ordered time series with at most one value per date.
///
/// Construction sorts by date ascending. When a date appears more than once,
/// the last occurrence in input order wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.observation_date);

        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.observation_date == obs.observation_date => *last = obs,
                _ => deduped.push(obs),
            }
        }

        Self { observations: deduped }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Observation::new(date, value))
                .collect(),
        )
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.observation_date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.observation_date)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.observations.last().map(|o| o.value)
    }

    /// Value recorded on `date`, if any.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.observations
            .binary_search_by_key(&date, |o| o.observation_date)
            .ok()
            .map(|idx| self.observations[idx].value)
    }

    /// A copy with every value multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> TimeSeries {
        TimeSeries {
            observations: self
                .observations
                .iter()
                .map(|o| Observation::new(o.observation_date, o.value * factor))
                .collect(),
        }
    }
}

impl From<Vec<Observation>> for TimeSeries {
    fn from(observations: Vec<Observation>) -> Self {
        TimeSeries::new(observations)
    }
}

impl From<TimeSeries> for Vec<Observation> {
    fn from(series: TimeSeries) -> Self {
        series.observations
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

/// How a selection that matches several series identifiers is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionPolicy {
    /// Use only the first identifier in repository order.
    #[default]
    First,
    /// Use every identifier, splitting the selection's weight evenly.
    All,
    /// Fail the computation when more than one identifier matches.
    ErrorOnAmbiguous,
}

/// Where observations come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local observations CSV.
    #[default]
    File,
    /// FRED `series/observations` API (requires `FRED_API_KEY`).
    Fred,
}

/// Output of one composite computation.
///
/// `individual`, `labels`, `series_ids` and `weights` are index-aligned: entry
/// `i` of each refers to the same resolved constituent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub composite: TimeSeries,
    pub individual: Vec<TimeSeries>,
    pub labels: Vec<String>,
    pub series_ids: Vec<SeriesId>,
    /// Effective weight (percent) applied to each constituent.
    pub weights: Vec<f64>,
}

impl CompositeResult {
    pub fn len(&self) -> usize {
        self.individual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individual.is_empty()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, `.env`, and defaults.
#[derive(Debug, Clone)]
pub struct ComputeConfig {
    pub selections: SelectionSet,
    pub policy: ResolutionPolicy,
    /// Resolve and fetch selections on the rayon pool.
    pub parallel: bool,
    /// Rescale each constituent so its mean over this year is 100.
    pub rebase_year: Option<i32>,
    /// Trailing display window in years; `None` shows the full history.
    pub window_years: Option<u32>,

    pub source: SourceKind,
    pub catalog_path: PathBuf,
    pub observations_path: Option<PathBuf>,

    /// Number of most recent rows to print in the terminal table.
    pub table_rows: usize,
    pub export_table: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
