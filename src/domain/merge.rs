//! Outer join of actual and forecast series on the month key.
//!
//! This is the one nontrivial routine of the dashboard: the merged output has
//! one row per month present in *either* input, sorted ascending, with `None`
//! on whichever side has no row for that month.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{ActualRow, ForecastRow, MergedRow};

/// Summary of a merged series, shown in reports and the TUI header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeStats {
    pub n_rows: usize,
    pub n_actual: usize,
    pub n_forecast: usize,
    /// Rows where both a lower and an upper bound are present.
    pub n_band: usize,
    pub month_min: Option<NaiveDate>,
    pub month_max: Option<NaiveDate>,
}

/// Outer-join `actual` and `forecast` on month.
///
/// Duplicate months within one input are collapsed: the last row wins. The
/// `BTreeMap` key gives us the sorted union of both month sets for free.
pub fn outer_join(actual: &[ActualRow], forecast: &[ForecastRow]) -> Vec<MergedRow> {
    let mut by_month: BTreeMap<NaiveDate, MergedRow> = BTreeMap::new();

    for row in actual {
        let entry = by_month.entry(row.month).or_insert(MergedRow {
            month: row.month,
            actual: None,
            forecast: None,
            lower: None,
            upper: None,
        });
        entry.actual = Some(row.value);
    }

    for row in forecast {
        let entry = by_month.entry(row.month).or_insert(MergedRow {
            month: row.month,
            actual: None,
            forecast: None,
            lower: None,
            upper: None,
        });
        entry.forecast = Some(row.forecast);
        entry.lower = row.lower;
        entry.upper = row.upper;
    }

    by_month.into_values().collect()
}

/// Compute row counts and month range for a merged series.
pub fn compute_stats(rows: &[MergedRow]) -> MergeStats {
    MergeStats {
        n_rows: rows.len(),
        n_actual: rows.iter().filter(|r| r.actual.is_some()).count(),
        n_forecast: rows.iter().filter(|r| r.forecast.is_some()).count(),
        n_band: rows.iter().filter(|r| r.band().is_some()).count(),
        month_min: rows.first().map(|r| r.month),
        month_max: rows.last().map(|r| r.month),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn outer_join_keeps_union_of_months() {
        // The worked example: Jan actual-only, Feb both, Mar forecast-only.
        let actual = vec![
            ActualRow { month: ymd(2021, 1), value: 100.0 },
            ActualRow { month: ymd(2021, 2), value: 110.0 },
        ];
        let forecast = vec![
            ForecastRow { month: ymd(2021, 2), forecast: 105.0, lower: Some(95.0), upper: Some(115.0) },
            ForecastRow { month: ymd(2021, 3), forecast: 120.0, lower: Some(110.0), upper: Some(130.0) },
        ];

        let merged = outer_join(&actual, &forecast);
        assert_eq!(merged.len(), 3);

        assert_eq!(merged[0].month, ymd(2021, 1));
        assert_eq!(merged[0].actual, Some(100.0));
        assert_eq!(merged[0].forecast, None);
        assert_eq!(merged[0].band(), None);

        assert_eq!(merged[1].month, ymd(2021, 2));
        assert_eq!(merged[1].actual, Some(110.0));
        assert_eq!(merged[1].forecast, Some(105.0));
        assert_eq!(merged[1].band(), Some((95.0, 115.0)));

        assert_eq!(merged[2].month, ymd(2021, 3));
        assert_eq!(merged[2].actual, None);
        assert_eq!(merged[2].forecast, Some(120.0));
        assert_eq!(merged[2].band(), Some((110.0, 130.0)));
    }

    #[test]
    fn outer_join_output_is_sorted_by_month() {
        let actual = vec![
            ActualRow { month: ymd(2021, 5), value: 1.0 },
            ActualRow { month: ymd(2021, 1), value: 2.0 },
        ];
        let forecast = vec![
            ForecastRow { month: ymd(2021, 3), forecast: 3.0, lower: None, upper: None },
        ];

        let merged = outer_join(&actual, &forecast);
        let months: Vec<NaiveDate> = merged.iter().map(|r| r.month).collect();
        assert_eq!(months, vec![ymd(2021, 1), ymd(2021, 3), ymd(2021, 5)]);
    }

    #[test]
    fn duplicate_months_last_row_wins() {
        let actual = vec![
            ActualRow { month: ymd(2021, 1), value: 1.0 },
            ActualRow { month: ymd(2021, 1), value: 9.0 },
        ];
        let merged = outer_join(&actual, &[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].actual, Some(9.0));
    }

    #[test]
    fn band_requires_both_bounds() {
        let forecast = vec![
            ForecastRow { month: ymd(2021, 1), forecast: 10.0, lower: Some(8.0), upper: None },
            ForecastRow { month: ymd(2021, 2), forecast: 11.0, lower: None, upper: Some(13.0) },
            ForecastRow { month: ymd(2021, 3), forecast: 12.0, lower: Some(10.0), upper: Some(14.0) },
        ];
        let merged = outer_join(&[], &forecast);
        assert_eq!(merged[0].band(), None);
        assert_eq!(merged[1].band(), None);
        assert_eq!(merged[2].band(), Some((10.0, 14.0)));
    }

    #[test]
    fn stats_count_sides_and_band() {
        let actual = vec![ActualRow { month: ymd(2021, 1), value: 100.0 }];
        let forecast = vec![
            ForecastRow { month: ymd(2021, 2), forecast: 105.0, lower: Some(95.0), upper: Some(115.0) },
        ];
        let merged = outer_join(&actual, &forecast);
        let stats = compute_stats(&merged);

        assert_eq!(stats.n_rows, 2);
        assert_eq!(stats.n_actual, 1);
        assert_eq!(stats.n_forecast, 1);
        assert_eq!(stats.n_band, 1);
        assert_eq!(stats.month_min, Some(ymd(2021, 1)));
        assert_eq!(stats.month_max, Some(ymd(2021, 2)));
    }
}
