//! Export merged rows to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts: canonical column names, blank cells for absent sides.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::MergedRow;
use crate::error::AppError;

/// Write merged rows to a CSV file in the canonical schema.
pub fn write_merged_csv(path: &Path, value_name: &str, rows: &[MergedRow]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(
        file,
        "Month,{value_name}_actual,{value_name}_forecast,{value_name}_lower,{value_name}_upper"
    )
    .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for row in rows {
        writeln!(
            file,
            "{},{},{},{},{}",
            row.month,
            fmt_cell(row.actual),
            fmt_cell(row.forecast),
            fmt_cell(row.lower),
            fmt_cell(row.upper),
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.6}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn export_writes_blank_cells_for_absent_sides() {
        let dir = std::env::temp_dir().join(format!("fo-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("merged.csv");

        let rows = vec![
            MergedRow {
                month: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
                actual: Some(100.0),
                forecast: None,
                lower: None,
                upper: None,
            },
            MergedRow {
                month: NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
                actual: None,
                forecast: Some(105.0),
                lower: Some(95.0),
                upper: Some(115.0),
            },
        ];

        write_merged_csv(&path, "Repayment", &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Month,Repayment_actual,Repayment_forecast,Repayment_lower,Repayment_upper"
        );
        assert_eq!(lines.next().unwrap(), "2021-01-01,100.000000,,,");
        assert_eq!(
            lines.next().unwrap(),
            "2021-02-01,,105.000000,95.000000,115.000000"
        );
    }
}
