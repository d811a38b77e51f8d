//! Read/write merged-series JSON files.
//!
//! The merged-series file is the "portable" representation of one rendered
//! view: title + value name + forecast source + the outer-joined rows. It is
//! written by `fo show --export-json` and consumed by `fo plot`, so a chart
//! can be re-rendered without the original data directory.
//!
//! The schema is defined by `domain::MergedFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{ForecastSource, MergedFile, MergedRow};
use crate::error::AppError;

/// Write a merged-series JSON file.
pub fn write_merged_json(
    path: &Path,
    title: &str,
    value_name: &str,
    source: ForecastSource,
    rows: &[MergedRow],
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create merged JSON '{}': {e}", path.display()))
    })?;

    let merged = MergedFile {
        tool: "fo".to_string(),
        title: title.to_string(),
        value_name: value_name.to_string(),
        source,
        rows: rows.to_vec(),
    };

    serde_json::to_writer_pretty(file, &merged)
        .map_err(|e| AppError::input(format!("Failed to write merged JSON: {e}")))?;

    Ok(())
}

/// Read a merged-series JSON file.
pub fn read_merged_json(path: &Path) -> Result<MergedFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open merged JSON '{}': {e}", path.display()))
    })?;
    let merged: MergedFile = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid merged JSON: {e}")))?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn json_roundtrip_preserves_rows() {
        let dir = std::env::temp_dir().join(format!("fo-series-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("merged.json");

        let rows = vec![MergedRow {
            month: NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
            actual: Some(110.0),
            forecast: Some(105.0),
            lower: Some(95.0),
            upper: Some(115.0),
        }];

        write_merged_json(&path, "Total Repayment: Actual vs Forecast", "Repayment", ForecastSource::Sarima, &rows)
            .unwrap();
        let merged = read_merged_json(&path).unwrap();

        assert_eq!(merged.tool, "fo");
        assert_eq!(merged.value_name, "Repayment");
        assert_eq!(merged.source, ForecastSource::Sarima);
        assert_eq!(merged.rows, rows);
    }

    #[test]
    fn invalid_json_is_an_input_error() {
        let dir = std::env::temp_dir().join(format!("fo-series-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = read_merged_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
