//! CSV ingest and normalization.
//!
//! This module turns the two on-disk CSV schema families into one canonical
//! shape (`Month` + `Actual` / `Forecast` / `Lower` / `Upper`):
//!
//! - Family A (suffixed): `Month,<Value>` actuals and
//!   `Month,<Value>_forecast[,<Value>_lower,<Value>_upper]` forecasts
//! - Family B (Prophet): `ds,y` actuals and
//!   `ds,yhat[,yhat_lower,yhat_upper]` forecasts
//!
//! The mapping is detected from the header row, so mixed data directories
//! (SARIMA-named files next to Prophet-named files) load through one codepath.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Deterministic behavior** (no guessing beyond the two known families)
//! - **Separation of concerns**: no merging or plotting here

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{ActualRow, ForecastRow, SeriesPair, ViewPlan};
use crate::error::AppError;

/// Load and normalize the actual/forecast CSV pair for a resolved view.
///
/// Any failure (missing file, malformed CSV, missing column, unparseable
/// month) is reported as an `AppError`; no partial tables are returned.
pub fn load_series_pair(plan: &ViewPlan) -> Result<SeriesPair, AppError> {
    let actual = read_actual_csv(&plan.actual_path, &plan.value_name)?;
    let forecast = read_forecast_csv(&plan.forecast_path, &plan.value_name)?;

    if actual.is_empty() && forecast.is_empty() {
        return Err(AppError::no_data(format!(
            "No data rows in '{}' or '{}'.",
            plan.actual_path.display(),
            plan.forecast_path.display()
        )));
    }

    Ok(SeriesPair {
        value_name: plan.value_name.clone(),
        actual,
        forecast,
    })
}

/// Read an actuals CSV (`Month,<Value>` or `ds,y`) into normalized rows.
pub fn read_actual_csv(path: &Path, value_name: &str) -> Result<Vec<ActualRow>, AppError> {
    let (mut reader, header_map) = open_csv(path)?;

    let value_lower = value_name.to_ascii_lowercase();
    let value_suffixed = format!("{value_lower}_actual");

    let month_idx = resolve_month_column(&header_map, path)?;
    let value_idx = resolve_column(
        &header_map,
        &[value_lower.as_str(), value_suffixed.as_str(), "y", "actual"],
    )
    .ok_or_else(|| {
        AppError::input(format!(
            "'{}' is missing the `{value_name}` value column (accepted: `{value_name}`, `{value_name}_actual`, `y`, `Actual`).",
            path.display()
        ))
    })?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;
        let record = record_or_error(result, path, line)?;

        let month = parse_month(get_required(&record, month_idx, path, line, "month")?)
            .map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display())))?;
        let value = parse_f64(get_required(&record, value_idx, path, line, "value")?)
            .map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display())))?;

        rows.push(ActualRow { month, value });
    }

    Ok(rows)
}

/// Read a forecast CSV (suffixed or Prophet naming) into normalized rows.
///
/// Lower/upper bound columns are optional; when absent (or blank for a row),
/// the confidence band silently degrades for the affected months.
pub fn read_forecast_csv(path: &Path, value_name: &str) -> Result<Vec<ForecastRow>, AppError> {
    let (mut reader, header_map) = open_csv(path)?;
    let value_lower = value_name.to_ascii_lowercase();
    let forecast_suffixed = format!("{value_lower}_forecast");
    let lower_suffixed = format!("{value_lower}_lower");
    let upper_suffixed = format!("{value_lower}_upper");

    let month_idx = resolve_month_column(&header_map, path)?;
    let forecast_idx = resolve_column(
        &header_map,
        &[
            forecast_suffixed.as_str(),
            "yhat",
            "forecast",
            value_lower.as_str(),
        ],
    )
    .ok_or_else(|| {
        AppError::input(format!(
            "'{}' is missing the forecast column (accepted: `{value_name}_forecast`, `yhat`, `Forecast`, `{value_name}`).",
            path.display()
        ))
    })?;

    let lower_idx = resolve_column(
        &header_map,
        &[lower_suffixed.as_str(), "yhat_lower", "lower"],
    );
    let upper_idx = resolve_column(
        &header_map,
        &[upper_suffixed.as_str(), "yhat_upper", "upper"],
    );

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record_or_error(result, path, line)?;

        let month = parse_month(get_required(&record, month_idx, path, line, "month")?)
            .map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display())))?;
        let forecast = parse_f64(get_required(&record, forecast_idx, path, line, "forecast")?)
            .map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display())))?;

        let lower = parse_optional_f64(&record, lower_idx, path, line)?;
        let upper = parse_optional_f64(&record, upper_idx, path, line)?;

        // A row with an inverted interval is malformed input, not a rendering
        // concern: refuse it here so every rendered band satisfies lower <= upper.
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                return Err(AppError::input(format!(
                    "{}:{line}: lower bound {lo} exceeds upper bound {hi}.",
                    path.display()
                )));
            }
        }

        rows.push(ForecastRow {
            month,
            forecast,
            lower,
            upper,
        });
    }

    Ok(rows)
}

fn open_csv(path: &Path) -> Result<(csv::Reader<std::fs::File>, HashMap<String, usize>), AppError> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers from '{}': {e}", path.display())))?
        .clone();

    Ok((reader, build_header_map(&headers)))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Month"). If we don't strip it, schema validation
    // will incorrectly report a missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_month_column(header_map: &HashMap<String, usize>, path: &Path) -> Result<usize, AppError> {
    resolve_column(header_map, &["month", "ds"]).ok_or_else(|| {
        AppError::input(format!(
            "'{}' is missing the date column (accepted: `Month`, `ds`).",
            path.display()
        ))
    })
}

/// First matching candidate wins; candidates are already lowercased.
fn resolve_column(header_map: &HashMap<String, usize>, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|name| header_map.get(*name).copied())
}

fn record_or_error(
    result: Result<StringRecord, csv::Error>,
    path: &Path,
    line: usize,
) -> Result<StringRecord, AppError> {
    result.map_err(|e| AppError::input(format!("{}:{line}: CSV parse error: {e}", path.display())))
}

fn get_required<'a>(
    record: &'a StringRecord,
    idx: usize,
    path: &Path,
    line: usize,
    what: &str,
) -> Result<&'a str, AppError> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::input(format!("{}:{line}: missing {what} value.", path.display())))
}

fn parse_optional_f64(
    record: &StringRecord,
    idx: Option<usize>,
    path: &Path,
    line: usize,
) -> Result<Option<f64>, AppError> {
    let Some(idx) = idx else { return Ok(None) };
    let Some(cell) = record.get(idx).map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    parse_f64(cell)
        .map(Some)
        .map_err(|e| AppError::input(format!("{}:{line}: {e}", path.display())))
}

/// Parse a month key into a `NaiveDate`.
///
/// We recommend ISO dates (`YYYY-MM-DD`), but monthly exports often carry a
/// bare `YYYY-MM` (normalized to the 1st) or locale-specific separators. We
/// accept a small set of common formats to reduce friction while keeping
/// parsing deterministic.
pub fn parse_month(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }

    // Bare month: YYYY-MM.
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok(d);
    }

    Err(format!(
        "Invalid month '{s}'. Expected one of: YYYY-MM-DD, YYYY-MM, YYYY/MM/DD, MM/DD/YYYY."
    ))
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("'{s}' is not a number."))?;
    if !v.is_finite() {
        return Err(format!("'{s}' is not a finite number."));
    }
    Ok(v)
}
