//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during merge/render
//! - exported to CSV/JSON
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The closed set of dashboard views.
///
/// `Recommendations` is a static text panel: it loads no data and draws no chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    TotalRepayment,
    ChurnRisk,
    Segments,
    Recommendations,
}

impl View {
    /// Sidebar order.
    pub const ALL: [View; 4] = [
        View::TotalRepayment,
        View::ChurnRisk,
        View::Segments,
        View::Recommendations,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            View::TotalRepayment => "Total Repayment",
            View::ChurnRisk => "Churn Risk Forecast",
            View::Segments => "Segment-Level Forecasts",
            View::Recommendations => "Recommendations",
        }
    }
}

/// Which forecasting batch job produced the forecast CSVs.
///
/// The two upstream dashboard copies disagree on forecast file naming (SARIMA
/// vs Prophet exports); neither is canonical, so the source is a runtime switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ForecastSource {
    Sarima,
    Prophet,
}

impl ForecastSource {
    pub fn display_name(self) -> &'static str {
        match self {
            ForecastSource::Sarima => "SARIMA",
            ForecastSource::Prophet => "Prophet",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ForecastSource::Sarima => ForecastSource::Prophet,
            ForecastSource::Prophet => ForecastSource::Sarima,
        }
    }
}

/// One observed (historical) value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActualRow {
    pub month: NaiveDate,
    pub value: f64,
}

/// One model-predicted value, with an optional confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastRow {
    pub month: NaiveDate,
    pub forecast: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// One row of the outer join of actuals and forecasts on the month key.
///
/// A side that has no row for this month is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub month: NaiveDate,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl MergedRow {
    /// The confidence band exists only where both bounds are present.
    pub fn band(&self) -> Option<(f64, f64)> {
        match (self.lower, self.upper) {
            (Some(lo), Some(hi)) => Some((lo, hi)),
            _ => None,
        }
    }
}

/// The two normalized tables for one view, before merging.
#[derive(Debug, Clone)]
pub struct SeriesPair {
    /// Canonical value name, e.g. `Repayment` or `Churn_Rate`.
    pub value_name: String,
    pub actual: Vec<ActualRow>,
    pub forecast: Vec<ForecastRow>,
}

/// A fully resolved view selection: which files to read and how to label them.
///
/// The router produces this; the loader and renderers consume it. Nothing here
/// survives past a single render call.
#[derive(Debug, Clone)]
pub struct ViewPlan {
    pub view: View,
    pub source: ForecastSource,
    pub title: String,
    /// Canonical value name (underscored), e.g. `Loan_Volume`.
    pub value_name: String,
    pub actual_path: PathBuf,
    pub forecast_path: PathBuf,
}

/// Portable representation of a merged series (written by `fo show --export-json`,
/// read back by `fo plot`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedFile {
    pub tool: String,
    pub title: String,
    pub value_name: String,
    pub source: ForecastSource,
    pub rows: Vec<MergedRow>,
}

/// Y-axis label: the semantic value name with underscores replaced by spaces.
pub fn value_axis_label(value_name: &str) -> String {
    value_name.replace('_', " ")
}
