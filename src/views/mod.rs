//! View router.
//!
//! Maps a sidebar/CLI selection to a concrete `ViewPlan` (file pair, value
//! name, title) or to the static recommendations panel. This is intentionally
//! kept separate from clap parsing and from the loader:
//! - clap handles structured flags/subcommands
//! - the router owns the path conventions and the segment catalog
//! - the loader only ever sees resolved paths
//!
//! Every selection is independent and stateless: paths are re-resolved and
//! files re-read on each render.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{ForecastSource, View, ViewPlan};
use crate::error::AppError;

/// Union of the segment lists from both upstream dashboard copies.
///
/// Used as the menu when no `actual_segment_*.csv` files are found on disk.
pub const DEFAULT_SEGMENTS: [&str; 4] = [
    "At-Risk Value Drainers",
    "Budget Loyalists",
    "High-Value Champions",
    "Long-term Sleepers",
];

/// Static text for the Recommendations view. No data is loaded for it.
pub const RECOMMENDATIONS: &str = "\
Business Recommendations

- Total Repayment Surge: investigate the post-2015 spike in repayment activity.
- Segment Monitoring: Long-term Sleepers show volatile patterns; recommend closer monitoring.
- Churn Reduction: focus on product diversification in high-churn cohorts.
- Hybrid Forecasting: combine SARIMA + Prophet for better segment accuracy.
- Anomaly Detection: add unsupervised anomaly models to flag repayment drops.
";

/// Resolve a data-backed view selection into a `ViewPlan`.
///
/// `Recommendations` is not resolvable (it has no files); callers render its
/// static text instead of invoking the loader.
pub fn resolve_view(
    view: View,
    source: ForecastSource,
    segment: Option<&str>,
    data_dir: &Path,
) -> Result<ViewPlan, AppError> {
    match view {
        View::TotalRepayment => Ok(ViewPlan {
            view,
            source,
            title: "Total Repayment: Actual vs Forecast".to_string(),
            value_name: "Repayment".to_string(),
            actual_path: data_dir.join("actuals").join("actual_total_repayment.csv"),
            forecast_path: data_dir.join("forecasts").join(match source {
                ForecastSource::Sarima => "sarima_forecast_results.csv",
                ForecastSource::Prophet => "prophet_total_repayment.csv",
            }),
        }),
        View::ChurnRisk => Ok(ViewPlan {
            view,
            source,
            title: "Churn Risk: Actual vs Forecast".to_string(),
            value_name: "Churn_Rate".to_string(),
            actual_path: data_dir.join("actuals").join("actual_churn_rate.csv"),
            forecast_path: data_dir.join("forecasts").join(match source {
                ForecastSource::Sarima => "forecast_churn_risk.csv",
                ForecastSource::Prophet => "prophet_churn_forecast.csv",
            }),
        }),
        View::Segments => {
            let segment = segment.ok_or_else(|| {
                AppError::input("The segment view requires a segment name (--segment).")
            })?;
            resolve_segment_view(segment, source, data_dir)
        }
        View::Recommendations => Err(AppError::input(
            "The Recommendations view is a static panel; it has no data files.",
        )),
    }
}

fn resolve_segment_view(
    segment: &str,
    source: ForecastSource,
    data_dir: &Path,
) -> Result<ViewPlan, AppError> {
    let stem = segment_file_stem(segment);
    let actual_path = data_dir
        .join("actuals")
        .join(format!("actual_segment_{stem}.csv"));
    let forecast_path = data_dir
        .join("forecasts")
        .join(format!("forecast_segment_{stem}.csv"));

    // The segment menu is open-ended (discovered from disk), so check
    // existence up front and report a not-found error instead of a bare
    // open() failure from the loader.
    if !actual_path.exists() || !forecast_path.exists() {
        return Err(AppError::input(format!(
            "Files for segment '{segment}' not found."
        )));
    }

    Ok(ViewPlan {
        view: View::Segments,
        source,
        title: format!("{segment}: Actual vs Forecast"),
        value_name: "Loan_Volume".to_string(),
        actual_path,
        forecast_path,
    })
}

/// Segment name to file stem: spaces become underscores.
pub fn segment_file_stem(segment: &str) -> String {
    segment.replace(' ', "_")
}

/// Segment names offered in the menu: what's on disk, else the default union.
pub fn segment_menu(data_dir: &Path) -> Vec<String> {
    let discovered = discover_segments(data_dir);
    if discovered.is_empty() {
        DEFAULT_SEGMENTS.iter().map(|s| s.to_string()).collect()
    } else {
        discovered
    }
}

/// Discover segments from `actuals/actual_segment_*.csv` (deterministic order).
pub fn discover_segments(data_dir: &Path) -> Vec<String> {
    let mut out = Vec::new();

    let Ok(entries) = fs::read_dir(data_dir.join("actuals")) else {
        return out;
    };

    for entry in entries.flatten() {
        let path: PathBuf = entry.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some(stem) = name
            .strip_prefix("actual_segment_")
            .and_then(|s| s.strip_suffix(".csv"))
        else {
            continue;
        };
        if !stem.is_empty() {
            out.push(stem.replace('_', " "));
        }
    }

    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_data_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fo-views-{}-{tag}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("actuals")).unwrap();
        fs::create_dir_all(dir.join("forecasts")).unwrap();
        dir
    }

    #[test]
    fn total_repayment_paths_per_source() {
        let dir = Path::new("data");

        let sarima =
            resolve_view(View::TotalRepayment, ForecastSource::Sarima, None, dir).unwrap();
        assert_eq!(sarima.value_name, "Repayment");
        assert!(sarima
            .forecast_path
            .ends_with("forecasts/sarima_forecast_results.csv"));

        let prophet =
            resolve_view(View::TotalRepayment, ForecastSource::Prophet, None, dir).unwrap();
        assert!(prophet
            .forecast_path
            .ends_with("forecasts/prophet_total_repayment.csv"));
        assert!(prophet
            .actual_path
            .ends_with("actuals/actual_total_repayment.csv"));
    }

    #[test]
    fn churn_paths_per_source() {
        let dir = Path::new("data");
        let sarima = resolve_view(View::ChurnRisk, ForecastSource::Sarima, None, dir).unwrap();
        assert!(sarima
            .forecast_path
            .ends_with("forecasts/forecast_churn_risk.csv"));
        let prophet = resolve_view(View::ChurnRisk, ForecastSource::Prophet, None, dir).unwrap();
        assert!(prophet
            .forecast_path
            .ends_with("forecasts/prophet_churn_forecast.csv"));
        assert_eq!(prophet.value_name, "Churn_Rate");
    }

    #[test]
    fn segment_names_are_underscored_in_paths() {
        assert_eq!(segment_file_stem("Long-term Sleepers"), "Long-term_Sleepers");
        assert_eq!(
            segment_file_stem("At-Risk Value Drainers"),
            "At-Risk_Value_Drainers"
        );
    }

    #[test]
    fn missing_segment_files_report_not_found() {
        let dir = temp_data_dir("missing");
        let err = resolve_view(
            View::Segments,
            ForecastSource::Prophet,
            Some("Budget Loyalists"),
            &dir,
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Budget Loyalists"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn existing_segment_files_resolve() {
        let dir = temp_data_dir("present");
        fs::write(
            dir.join("actuals").join("actual_segment_Long-term_Sleepers.csv"),
            "Month,Loan_Volume\n",
        )
        .unwrap();
        fs::write(
            dir.join("forecasts").join("forecast_segment_Long-term_Sleepers.csv"),
            "Month,Loan_Volume_forecast\n",
        )
        .unwrap();

        let plan = resolve_view(
            View::Segments,
            ForecastSource::Sarima,
            Some("Long-term Sleepers"),
            &dir,
        )
        .unwrap();
        assert_eq!(plan.title, "Long-term Sleepers: Actual vs Forecast");
        assert_eq!(plan.value_name, "Loan_Volume");
    }

    #[test]
    fn segment_menu_discovers_disk_segments() {
        let dir = temp_data_dir("menu");
        fs::write(
            dir.join("actuals").join("actual_segment_Budget_Loyalists.csv"),
            "",
        )
        .unwrap();
        fs::write(
            dir.join("actuals").join("actual_segment_At-Risk_Value_Drainers.csv"),
            "",
        )
        .unwrap();

        let menu = segment_menu(&dir);
        assert_eq!(menu, vec!["At-Risk Value Drainers", "Budget Loyalists"]);
    }

    #[test]
    fn segment_menu_falls_back_to_default_union() {
        let dir = temp_data_dir("fallback");
        let menu = segment_menu(&dir);
        assert_eq!(menu.len(), DEFAULT_SEGMENTS.len());
        assert_eq!(menu[0], DEFAULT_SEGMENTS[0]);
    }

    #[test]
    fn recommendations_has_no_plan() {
        let err = resolve_view(
            View::Recommendations,
            ForecastSource::Sarima,
            None,
            Path::new("data"),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!RECOMMENDATIONS.is_empty());
    }
}
