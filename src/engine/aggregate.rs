//! Weighting and outer-join aggregation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::domain::{CompositeResult, Observation, TimeSeries};
use crate::engine::rebase::rebase_to_year;
use crate::engine::resolver::ResolvedSeries;

/// Scale a series by a percentage weight (`value * weight_percent / 100`).
pub fn weighted(series: &TimeSeries, weight_percent: f64) -> TimeSeries {
    series.scaled(weight_percent / 100.0)
}

/// Sum series on the outer union of their dates.
///
/// A series with no row on a given date contributes 0 to that date. The
/// result is ascending by date and does not depend on input order.
pub fn aggregate<'a, I>(series: I) -> TimeSeries
where
    I: IntoIterator<Item = &'a TimeSeries>,
{
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for s in series {
        for obs in s {
            *totals.entry(obs.observation_date).or_insert(0.0) += obs.value;
        }
    }
    TimeSeries::new(
        totals
            .into_iter()
            .map(|(date, value)| Observation::new(date, value))
            .collect(),
    )
}

/// Build the composite and the index-aligned constituent lists.
///
/// With `rebase_year` set, each constituent is rebased before weighting and
/// the rebased values are what the individual outputs show.
pub fn build_composite(resolved: Vec<ResolvedSeries>, rebase_year: Option<i32>) -> CompositeResult {
    let mut result = CompositeResult::default();
    let mut weighted_series = Vec::with_capacity(resolved.len());

    for entry in resolved {
        let individual = match rebase_year {
            Some(year) => rebase_to_year(&entry.series, year).unwrap_or_else(|| {
                if !entry.series.is_empty() {
                    warn!(
                        series_id = entry.series_id.as_str(),
                        year, "no usable observations in base year, leaving series unrebased"
                    );
                }
                entry.series.clone()
            }),
            None => entry.series,
        };

        weighted_series.push(weighted(&individual, entry.weight_percent));
        result.individual.push(individual);
        result.labels.push(entry.label);
        result.series_ids.push(entry.series_id);
        result.weights.push(entry.weight_percent);
    }

    result.composite = aggregate(&weighted_series);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesId;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn resolved(label: &str, weight: f64, points: Vec<(NaiveDate, f64)>) -> ResolvedSeries {
        ResolvedSeries {
            label: label.to_string(),
            series_id: SeriesId::new(format!("{label}-id")),
            weight_percent: weight,
            series: TimeSeries::from_pairs(points),
        }
    }

    #[test]
    fn weighting_scales_every_row() {
        let s = TimeSeries::from_pairs(vec![(d(2020, 1), 10.0), (d(2020, 2), -4.0), (d(2020, 3), 0.0)]);
        for w in [0.0, 12.5, 60.0, 100.0] {
            let ws = weighted(&s, w);
            for (orig, scaled) in s.iter().zip(ws.iter()) {
                assert_eq!(orig.observation_date, scaled.observation_date);
                assert!((scaled.value - orig.value * w / 100.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn missing_dates_contribute_zero() {
        let a = TimeSeries::from_pairs(vec![(d(2020, 1), 1.0), (d(2020, 2), 2.0)]);
        let b = TimeSeries::from_pairs(vec![(d(2020, 2), 20.0), (d(2020, 3), 30.0)]);
        let c = aggregate([&a, &b]);

        let rows: Vec<(NaiveDate, f64)> = c.iter().map(|o| (o.observation_date, o.value)).collect();
        assert_eq!(rows, vec![(d(2020, 1), 1.0), (d(2020, 2), 22.0), (d(2020, 3), 30.0)]);
    }

    #[test]
    fn aggregation_ignores_input_order() {
        let a = TimeSeries::from_pairs(vec![(d(2020, 1), 1.5), (d(2020, 4), 2.25)]);
        let b = TimeSeries::from_pairs(vec![(d(2020, 2), 4.0), (d(2020, 4), 8.0)]);
        let c = TimeSeries::from_pairs(vec![(d(2020, 1), 16.0), (d(2020, 3), 0.5)]);

        let forward = aggregate([&a, &b, &c]);
        for perm in [[&c, &b, &a], [&b, &a, &c], [&c, &a, &b]] {
            assert_eq!(aggregate(perm), forward);
        }
    }

    #[test]
    fn empty_input_yields_empty_composite() {
        let result = build_composite(Vec::new(), None);
        assert!(result.composite.is_empty());
        assert!(result.individual.is_empty());
        assert!(result.labels.is_empty());
        assert!(result.series_ids.is_empty());
    }

    #[test]
    fn individuals_stay_unweighted_and_aligned() {
        let result = build_composite(
            vec![
                resolved("Steel", 60.0, vec![(d(2021, 2), 12.0), (d(2021, 1), 10.0)]),
                resolved("Oil", 40.0, vec![(d(2021, 1), 20.0), (d(2021, 2), 22.0)]),
            ],
            None,
        );

        assert_eq!(result.labels, vec!["Steel", "Oil"]);
        assert_eq!(result.series_ids[1], SeriesId::from("Oil-id"));
        assert_eq!(result.individual[0].value_on(d(2021, 1)), Some(10.0));
        assert!((result.composite.value_on(d(2021, 1)).unwrap() - 14.0).abs() < 1e-9);
        assert!((result.composite.value_on(d(2021, 2)).unwrap() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn empty_constituent_keeps_its_slot() {
        let result = build_composite(
            vec![
                resolved("Steel", 50.0, Vec::new()),
                resolved("Oil", 50.0, vec![(d(2021, 1), 20.0)]),
            ],
            None,
        );
        assert_eq!(result.len(), 2);
        assert!(result.individual[0].is_empty());
        assert_eq!(result.composite.len(), 1);
        assert!((result.composite.value_on(d(2021, 1)).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn rebase_applies_before_weighting() {
        let result = build_composite(
            vec![resolved(
                "Steel",
                50.0,
                vec![(d(2020, 1), 190.0), (d(2020, 2), 210.0), (d(2021, 1), 300.0)],
            )],
            Some(2020),
        );
        assert!((result.individual[0].value_on(d(2021, 1)).unwrap() - 150.0).abs() < 1e-9);
        assert!((result.composite.value_on(d(2021, 1)).unwrap() - 75.0).abs() < 1e-9);
    }
}
