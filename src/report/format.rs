//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the load/merge code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{value_axis_label, MergeStats, MergedRow, ViewPlan};

/// Format the view summary (files, source, merge stats).
pub fn format_view_summary(plan: &ViewPlan, stats: &MergeStats) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== fo - {} ===\n", plan.title));
    out.push_str(&format!("Source  : {}\n", plan.source.display_name()));
    out.push_str(&format!("Actuals : {}\n", plan.actual_path.display()));
    out.push_str(&format!("Forecast: {}\n", plan.forecast_path.display()));

    let months = match (stats.month_min, stats.month_max) {
        (Some(lo), Some(hi)) => format!("[{}, {}]", lo.format("%Y-%m"), hi.format("%Y-%m")),
        _ => "[-]".to_string(),
    };
    out.push_str(&format!(
        "Rows: n={} (actual={}, forecast={}, band={}) | months={months}\n",
        stats.n_rows, stats.n_actual, stats.n_forecast, stats.n_band,
    ));

    out
}

/// Format the merged rows as a fixed-width table.
///
/// Absent sides render as `-`, mirroring the chart's one-sided months.
pub fn format_merged_table(rows: &[MergedRow], value_name: &str) -> String {
    let label = value_axis_label(value_name);
    let mut out = String::new();

    out.push_str(
        format!(
            "{:<10} {:>14} {:>14} {:>14} {:>14}\n",
            "Month", "Actual", "Forecast", "Lower", "Upper"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<14} {:-<14} {:-<14} {:-<14}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for row in rows {
        out.push_str(
            format!(
                "{:<10} {:>14} {:>14} {:>14} {:>14}\n",
                row.month.format("%Y-%m").to_string(),
                fmt_value(row.actual),
                fmt_value(row.forecast),
                fmt_value(row.lower),
                fmt_value(row.upper),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&format!("({} rows, value: {label})\n", rows.len()));

    out
}

fn fmt_value(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.4}"),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastSource, View};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn summary_includes_counts_and_month_range() {
        let plan = ViewPlan {
            view: View::TotalRepayment,
            source: ForecastSource::Sarima,
            title: "Total Repayment: Actual vs Forecast".to_string(),
            value_name: "Repayment".to_string(),
            actual_path: PathBuf::from("actuals/actual_total_repayment.csv"),
            forecast_path: PathBuf::from("forecasts/sarima_forecast_results.csv"),
        };
        let stats = MergeStats {
            n_rows: 3,
            n_actual: 2,
            n_forecast: 2,
            n_band: 2,
            month_min: Some(ymd(2021, 1)),
            month_max: Some(ymd(2021, 3)),
        };

        let out = format_view_summary(&plan, &stats);
        assert!(out.contains("Source  : SARIMA"));
        assert!(out.contains("n=3 (actual=2, forecast=2, band=2)"));
        assert!(out.contains("months=[2021-01, 2021-03]"));
    }

    #[test]
    fn table_renders_dashes_for_absent_sides() {
        let rows = vec![MergedRow {
            month: ymd(2021, 1),
            actual: Some(100.0),
            forecast: None,
            lower: None,
            upper: None,
        }];

        let out = format_merged_table(&rows, "Loan_Volume");
        let data_line = out.lines().nth(2).unwrap();
        assert!(data_line.starts_with("2021-01"));
        assert!(data_line.contains("100.0000"));
        assert!(data_line.ends_with('-'));
        assert!(out.contains("value: Loan Volume"));
    }
}
