//! Composite index engine.
//!
//! `resolver` turns selections into fetched constituents, `aggregate` weights
//! them and sums on the outer union of dates, `window` filters for display.

pub mod aggregate;
pub mod rebase;
pub mod resolver;
pub mod window;

use tracing::{info, warn};

use crate::data::SeriesRepository;
use crate::domain::{CompositeResult, ResolutionPolicy, SelectionSet};
use crate::error::AppError;

pub use aggregate::{aggregate, build_composite, weighted};
pub use resolver::{ResolvedSeries, resolve_all};
pub use window::DisplayWindow;

/// Knobs for one computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputeOptions {
    pub policy: ResolutionPolicy,
    pub parallel: bool,
    pub rebase_year: Option<i32>,
}

/// Resolve, fetch, weight and aggregate a selection set.
///
/// Data-shape problems (no match, empty series, weights not summing to 100)
/// shrink the result instead of failing. Only an unreachable data source or
/// an ambiguous match under [`ResolutionPolicy::ErrorOnAmbiguous`] is an error.
pub fn compute_composite<R>(
    repo: &R,
    selections: &SelectionSet,
    options: ComputeOptions,
) -> Result<CompositeResult, AppError>
where
    R: SeriesRepository + ?Sized,
{
    if !selections.is_empty() && !selections.is_balanced() {
        warn!(
            total = selections.total_weight(),
            "selection weights do not add up to 100%"
        );
    }

    let resolved = resolve_all(repo, selections.as_slice(), options.policy, options.parallel)?;

    let result = build_composite(resolved, options.rebase_year);
    info!(
        selections = selections.len(),
        constituents = result.len(),
        rows = result.composite.len(),
        "composite computed"
    );
    Ok(result)
}
