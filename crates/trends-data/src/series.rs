//! Chart-ready series derivation over the aggregated totals.
//!
//! Both entry points are pure functions of an [`AggregatedData`] and the
//! requested selector: they never mutate shared state, so they are safe to
//! call repeatedly and from multiple threads over the same dataset. Series
//! are cheap to recompute and are not cached here.

use std::collections::HashMap;

use trends_core::models::ChartPoint;
use trends_core::months;

use crate::aggregator::AggregatedData;

/// The monthly series for a single drug, sorted chronologically.
///
/// Sorting is by year ascending, then calendar-month index ascending within a
/// year. A `drug` absent from the catalog yields an empty series, not an
/// error — the consumer can render "no data" instead of failing.
pub fn series_for_drug(data: &AggregatedData, drug: &str) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = data
        .totals
        .iter()
        .filter(|(key, _)| key.drug == drug)
        .map(|(key, value)| ChartPoint::new(key.year, key.month.clone(), *value))
        .collect();

    sort_chronologically(&mut points);
    points
}

/// The combined "All" series: per-month sums across every drug.
///
/// Totals that share a `(year, month)` are merged onto one point regardless
/// of drug, then sorted as in [`series_for_drug`]. This is the default view.
pub fn series_for_all(data: &AggregatedData) -> Vec<ChartPoint> {
    let mut by_month: HashMap<(i32, String), f64> = HashMap::new();
    for (key, value) in &data.totals {
        *by_month
            .entry((key.year, key.month.clone()))
            .or_insert(0.0) += value;
    }

    let mut points: Vec<ChartPoint> = by_month
        .into_iter()
        .map(|((year, month), value)| ChartPoint::new(year, month, value))
        .collect();

    sort_chronologically(&mut points);
    points
}

/// Order points by `(year, calendar month)`; unrecognised month names sort
/// after December, by name.
fn sort_chronologically(points: &mut [ChartPoint]) {
    points.sort_by(|a, b| {
        a.year
            .cmp(&b.year)
            .then_with(|| months::sort_key(&a.month).cmp(&months::sort_key(&b.month)))
    });
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use trends_core::models::{DrugEntry, TotalKey};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn dataset(entries: &[(i32, &str, &str, f64)]) -> AggregatedData {
        let mut totals = HashMap::new();
        let mut drugs: Vec<DrugEntry> = Vec::new();
        for (year, month, drug, value) in entries {
            *totals
                .entry(TotalKey::new(*year, *month, *drug))
                .or_insert(0.0) += value;
            if !drugs.iter().any(|d| d.name == *drug) {
                drugs.push(DrugEntry {
                    name: drug.to_string(),
                    full_name: drug.to_string(),
                });
            }
        }
        drugs.sort_by(|a, b| a.name.cmp(&b.name));
        AggregatedData { drugs, totals }
    }

    // ── series_for_drug ───────────────────────────────────────────────────────

    #[test]
    fn test_series_for_drug_selects_only_that_drug() {
        let data = dataset(&[
            (2021, "March", "Heroin", 10.0),
            (2021, "March", "Cocaine", 5.0),
            (2021, "April", "Heroin", 20.0),
        ]);
        let series = series_for_drug(&data, "Heroin");
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|p| p.date_key.contains("2021")));
        assert_eq!(series[0].value, 10.0);
        assert_eq!(series[1].value, 20.0);
    }

    #[test]
    fn test_series_for_drug_unknown_name_empty() {
        let data = dataset(&[(2021, "March", "Heroin", 10.0)]);
        assert!(series_for_drug(&data, "Fentanyl").is_empty());
    }

    #[test]
    fn test_series_for_drug_sorted_by_year_then_month() {
        let data = dataset(&[
            (2022, "January", "Heroin", 4.0),
            (2021, "December", "Heroin", 3.0),
            (2021, "February", "Heroin", 2.0),
            (2021, "January", "Heroin", 1.0),
        ]);
        let series = series_for_drug(&data, "Heroin");
        let keys: Vec<&str> = series.iter().map(|p| p.date_key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "2021-January",
                "2021-February",
                "2021-December",
                "2022-January"
            ]
        );
    }

    #[test]
    fn test_series_sort_invariant_pairwise() {
        let data = dataset(&[
            (2020, "November", "Heroin", 1.0),
            (2021, "June", "Heroin", 1.0),
            (2019, "December", "Heroin", 1.0),
            (2021, "January", "Heroin", 1.0),
            (2020, "February", "Heroin", 1.0),
        ]);
        let series = series_for_drug(&data, "Heroin");
        for pair in series.windows(2) {
            let (x, y) = (&pair[0], &pair[1]);
            let x_month = months::month_index(&x.month).unwrap();
            let y_month = months::month_index(&y.month).unwrap();
            assert!(x.year < y.year || (x.year == y.year && x_month < y_month));
        }
    }

    #[test]
    fn test_series_point_shape() {
        let data = dataset(&[(2021, "March", "Heroin", 10.0)]);
        let series = series_for_drug(&data, "Heroin");
        assert_eq!(series[0].date_key, "2021-March");
        assert_eq!(series[0].label, "Mar 2021");
        assert_eq!(series[0].month, "March");
        assert_eq!(series[0].year, 2021);
    }

    #[test]
    fn test_series_date_keys_unique() {
        let data = dataset(&[
            (2021, "March", "Heroin", 10.0),
            (2021, "April", "Heroin", 20.0),
            (2022, "March", "Heroin", 30.0),
        ]);
        let series = series_for_drug(&data, "Heroin");
        let mut keys: Vec<&str> = series.iter().map(|p| p.date_key.as_str()).collect();
        keys.dedup();
        assert_eq!(keys.len(), series.len());
    }

    #[test]
    fn test_series_unknown_month_sorts_last() {
        let data = dataset(&[
            (2021, "Pluviôse", "Heroin", 1.0),
            (2021, "December", "Heroin", 2.0),
        ]);
        let series = series_for_drug(&data, "Heroin");
        assert_eq!(series[0].month, "December");
        assert_eq!(series[1].month, "Pluviôse");
    }

    // ── series_for_all ────────────────────────────────────────────────────────

    #[test]
    fn test_series_for_all_sums_across_drugs() {
        let data = dataset(&[
            (2021, "March", "Heroin", 10.0),
            (2021, "March", "Cocaine", 5.0),
        ]);
        let series = series_for_all(&data);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date_key, "2021-March");
        assert_eq!(series[0].value, 15.0);
    }

    #[test]
    fn test_series_for_all_keeps_months_apart() {
        let data = dataset(&[
            (2021, "March", "Heroin", 10.0),
            (2021, "April", "Cocaine", 5.0),
        ]);
        let series = series_for_all(&data);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 10.0);
        assert_eq!(series[1].value, 5.0);
    }

    #[test]
    fn test_series_for_all_sorted() {
        let data = dataset(&[
            (2022, "January", "Cocaine", 1.0),
            (2021, "December", "Heroin", 1.0),
            (2021, "March", "Heroin", 1.0),
        ]);
        let series = series_for_all(&data);
        let keys: Vec<&str> = series.iter().map(|p| p.date_key.as_str()).collect();
        assert_eq!(keys, vec!["2021-March", "2021-December", "2022-January"]);
    }

    #[test]
    fn test_series_for_all_empty_dataset() {
        let data = dataset(&[]);
        assert!(series_for_all(&data).is_empty());
    }

    #[test]
    fn test_series_builders_do_not_mutate_input() {
        let data = dataset(&[
            (2021, "March", "Heroin", 10.0),
            (2021, "March", "Cocaine", 5.0),
        ]);
        let before = data.clone();
        let _ = series_for_all(&data);
        let _ = series_for_drug(&data, "Heroin");
        assert_eq!(data, before);
    }
}
