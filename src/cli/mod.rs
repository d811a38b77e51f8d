//! Command-line parsing for the forecast overlay dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the loading/merging code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ForecastSource, View};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fo", version, about = "Forecast Overlay Dashboard (actuals vs SARIMA/Prophet CSVs)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a view's CSV pair, print the merged summary, and optionally plot/export.
    Show(ShowArgs),
    /// Plot a previously exported merged-series JSON.
    Plot(PlotArgs),
    /// Write a seeded demo data directory (all views, both source conventions).
    Sample(SampleArgs),
    /// Launch the interactive TUI dashboard.
    ///
    /// This uses the same underlying load/merge pipeline as `fo show`, but renders
    /// results in a terminal UI using Ratatui.
    Tui(ViewArgs),
}

/// Common options for selecting and loading a view.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// Which dashboard view to load.
    #[arg(short = 'v', long, value_enum, default_value_t = View::TotalRepayment)]
    pub view: View,

    /// Segment name for the segment-level view (e.g. "Budget Loyalists").
    #[arg(short = 's', long)]
    pub segment: Option<String>,

    /// Forecast source convention to read (selects the forecast file set).
    #[arg(long, value_enum, default_value_t = ForecastSource::Sarima)]
    pub source: ForecastSource,

    /// Directory containing `actuals/` and `forecasts/`.
    #[arg(short = 'd', long, default_value = "data")]
    pub data_dir: PathBuf,
}

/// Options for `fo show`.
#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Print the merged rows as a table.
    #[arg(long)]
    pub table: bool,

    /// Disable the terminal plot (rendered by default).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the merged series to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the merged series (title + rows) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved merged series.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Merged-series JSON file produced by `fo show --export-json`.
    #[arg(long, value_name = "JSON")]
    pub merged: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for the demo-data generator.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output directory (will contain `actuals/` and `forecasts/`).
    #[arg(short = 'o', long, default_value = "data")]
    pub out_dir: PathBuf,

    /// Random seed for noise generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of historical (actual) months.
    #[arg(long, default_value_t = 72)]
    pub months: usize,

    /// Number of forecast-only months past the actual range.
    #[arg(long, default_value_t = 12)]
    pub horizon: usize,
}
