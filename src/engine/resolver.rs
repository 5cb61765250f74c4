//! Selection -> series resolution.
//!
//! Each selection is looked up in the repository and, depending on the
//! [`ResolutionPolicy`], turned into zero or more fetched constituents.
//!
//! Degradation rules:
//! - no matching identifier: the selection is dropped
//! - a `Request` error while resolving: treated as no match
//! - a `Request` error while fetching: treated as an empty series
//! - an `Unreachable` error anywhere: the computation fails

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::data::SeriesRepository;
use crate::domain::{ResolutionPolicy, Selection, SeriesId, TimeSeries};
use crate::error::AppError;

/// One fetched constituent, ready for weighting.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub label: String,
    pub series_id: SeriesId,
    /// Weight (percent) this constituent carries in the composite.
    pub weight_percent: f64,
    pub series: TimeSeries,
}

/// Resolve and fetch every selection, keeping selection order.
///
/// With `parallel` set, selections are processed on the rayon pool; the
/// output order is the same either way.
pub fn resolve_all<R>(
    repo: &R,
    selections: &[Selection],
    policy: ResolutionPolicy,
    parallel: bool,
) -> Result<Vec<ResolvedSeries>, AppError>
where
    R: SeriesRepository + ?Sized,
{
    let per_selection: Vec<Vec<ResolvedSeries>> = if parallel {
        selections
            .par_iter()
            .map(|selection| resolve_selection(repo, selection, policy))
            .collect::<Result<_, _>>()?
    } else {
        selections
            .iter()
            .map(|selection| resolve_selection(repo, selection, policy))
            .collect::<Result<_, _>>()?
    };

    Ok(per_selection.into_iter().flatten().collect())
}

/// Resolve one selection to its constituents.
pub fn resolve_selection<R>(
    repo: &R,
    selection: &Selection,
    policy: ResolutionPolicy,
) -> Result<Vec<ResolvedSeries>, AppError>
where
    R: SeriesRepository + ?Sized,
{
    let ids = match repo.resolve_series(selection.category_2(), Some(selection.category_3())) {
        Ok(ids) => ids,
        Err(err) if err.is_fatal() => return Err(err.into()),
        Err(err) => {
            warn!(
                category_2 = selection.category_2(),
                category_3 = selection.category_3(),
                "resolution failed, dropping selection: {err}"
            );
            Vec::new()
        }
    };

    let chosen = apply_policy(selection, ids, policy)?;
    if chosen.is_empty() {
        debug!(
            category_2 = selection.category_2(),
            category_3 = selection.category_3(),
            "no series for selection"
        );
        return Ok(Vec::new());
    }

    let weight_percent = selection.weight_percent() / chosen.len() as f64;
    let mut out = Vec::with_capacity(chosen.len());
    for series_id in chosen {
        let series = match repo.fetch_series(&series_id) {
            Ok(series) => series,
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                warn!(series_id = series_id.as_str(), "fetch failed, using empty series: {err}");
                TimeSeries::default()
            }
        };
        if series.is_empty() {
            debug!(series_id = series_id.as_str(), "series has no observations");
        }
        out.push(ResolvedSeries {
            label: selection.category_3().to_string(),
            series_id,
            weight_percent,
            series,
        });
    }

    Ok(out)
}

fn apply_policy(
    selection: &Selection,
    ids: Vec<SeriesId>,
    policy: ResolutionPolicy,
) -> Result<Vec<SeriesId>, AppError> {
    match policy {
        ResolutionPolicy::First => Ok(ids.into_iter().take(1).collect()),
        ResolutionPolicy::All => Ok(ids),
        ResolutionPolicy::ErrorOnAmbiguous if ids.len() > 1 => {
            let listed: Vec<&str> = ids.iter().map(SeriesId::as_str).collect();
            Err(AppError::new(
                3,
                format!(
                    "Selection {}/{} matches {} series ({}).",
                    selection.category_2(),
                    selection.category_3(),
                    ids.len(),
                    listed.join(", ")
                ),
            ))
        }
        ResolutionPolicy::ErrorOnAmbiguous => Ok(ids),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::InMemoryRepository;
    use crate::error::RepositoryError;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn steel_repo() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_series("Metals", "Steel", "id1", vec![(d(2021, 1), 10.0)])
            .with_series("Metals", "Steel", "id2", vec![(d(2021, 1), 30.0)])
    }

    #[test]
    fn first_policy_never_fetches_later_matches() {
        let repo = steel_repo();
        let sel = Selection::new("Metals", "Steel", 100.0).unwrap();
        let out = resolve_selection(&repo, &sel, ResolutionPolicy::First).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].series_id, SeriesId::from("id1"));
        assert_eq!(repo.fetched(), vec![SeriesId::from("id1")]);
    }

    #[test]
    fn all_policy_splits_weight() {
        let repo = steel_repo();
        let sel = Selection::new("Metals", "Steel", 60.0).unwrap();
        let out = resolve_selection(&repo, &sel, ResolutionPolicy::All).unwrap();

        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| (r.weight_percent - 30.0).abs() < 1e-12));
        assert!(out.iter().all(|r| r.label == "Steel"));
    }

    #[test]
    fn ambiguous_policy_fails_on_multiple_matches() {
        let repo = steel_repo();
        let sel = Selection::new("Metals", "Steel", 60.0).unwrap();
        let err = resolve_selection(&repo, &sel, ResolutionPolicy::ErrorOnAmbiguous).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(repo.fetched().is_empty());
    }

    #[test]
    fn unknown_pair_is_dropped() {
        let repo = steel_repo();
        let sel = Selection::new("Metals", "Copper", 50.0).unwrap();
        assert!(resolve_selection(&repo, &sel, ResolutionPolicy::First).unwrap().is_empty());
    }

    #[test]
    fn request_errors_degrade() {
        let repo = steel_repo()
            .failing_resolve("Energy", "Oil", RepositoryError::Request("timeout".into()))
            .with_mapping("Energy", "Gas", "gas")
            .failing_fetch("gas", RepositoryError::Request("500".into()));

        let oil = Selection::new("Energy", "Oil", 50.0).unwrap();
        assert!(resolve_selection(&repo, &oil, ResolutionPolicy::First).unwrap().is_empty());

        let gas = Selection::new("Energy", "Gas", 50.0).unwrap();
        let out = resolve_selection(&repo, &gas, ResolutionPolicy::First).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].series.is_empty());
    }

    #[test]
    fn unreachable_errors_propagate() {
        let repo = steel_repo().failing_fetch("id1", RepositoryError::Unreachable("down".into()));
        let sel = Selection::new("Metals", "Steel", 100.0).unwrap();
        let err = resolve_selection(&repo, &sel, ResolutionPolicy::First).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn parallel_resolution_keeps_selection_order() {
        let mut repo = InMemoryRepository::new();
        let mut selections = Vec::new();
        for i in 0..10 {
            let c3 = format!("S{i}");
            let id = format!("id{i}");
            repo = repo.with_series("Metals", &c3, &id, vec![(d(2021, 1), i as f64)]);
            selections.push(Selection::new("Metals", c3, 10.0).unwrap());
        }

        let sequential = resolve_all(&repo, &selections, ResolutionPolicy::First, false).unwrap();
        let parallel = resolve_all(&repo, &selections, ResolutionPolicy::First, true).unwrap();
        assert_eq!(sequential, parallel);
        let labels: Vec<&str> = parallel.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["S0", "S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8", "S9"]);
    }
}
