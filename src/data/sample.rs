//! Seeded demo-data generator (`fo sample`).
//!
//! Writes a complete data directory in both upstream naming conventions so
//! every view and both forecast sources work out of the box:
//!
//! ```text
//! <out>/actuals/actual_total_repayment.csv        Month,Repayment
//! <out>/actuals/actual_churn_rate.csv             Month,Churn_Rate
//! <out>/actuals/actual_segment_<Name>.csv         Month,Loan_Volume
//! <out>/forecasts/sarima_forecast_results.csv     Month,Repayment_forecast,...
//! <out>/forecasts/forecast_churn_risk.csv         Month,Churn_Rate_forecast,...
//! <out>/forecasts/forecast_segment_<Name>.csv     Month,Loan_Volume_forecast,...
//! <out>/forecasts/prophet_total_repayment.csv     ds,yhat,yhat_lower,yhat_upper
//! <out>/forecasts/prophet_churn_forecast.csv      ds,yhat,yhat_lower,yhat_upper
//! ```
//!
//! Forecast files cover the trailing quarter of the actual range plus a
//! future horizon, so merged series have actual-only, overlapping, and
//! forecast-only months.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::AppError;
use crate::views::{segment_file_stem, DEFAULT_SEGMENTS};

const START_YEAR: i32 = 2013;

/// Generate a demo data directory. Returns the files written.
pub fn write_demo_data(
    out_dir: &Path,
    seed: u64,
    months: usize,
    horizon: usize,
) -> Result<Vec<PathBuf>, AppError> {
    if months < 2 {
        return Err(AppError::input("sample: --months must be at least 2"));
    }

    let actuals_dir = out_dir.join("actuals");
    let forecasts_dir = out_dir.join("forecasts");
    fs::create_dir_all(&actuals_dir)
        .and(fs::create_dir_all(&forecasts_dir))
        .map_err(|e| AppError::input(format!("sample: cannot create {}: {e}", out_dir.display())))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(2, format!("sample: bad noise parameters: {e}")))?;

    let start = NaiveDate::from_ymd_opt(START_YEAR, 1, 1)
        .ok_or_else(|| AppError::new(2, "sample: bad start date"))?;
    let timeline: Vec<NaiveDate> = (0..months + horizon)
        .map(|i| start + Months::new(i as u32))
        .collect();

    // Forecasts overlap the last quarter of the actual range.
    let overlap = (months / 4).max(1);
    let forecast_from = months - overlap;

    let mut written = Vec::new();

    // Total repayment: steady growth with a surge after 2015.
    let repayment = Series::new("Repayment", 2_500.0, |m, base| {
        let t = m.signed_duration_since(base).num_days() as f64 / 30.44;
        let surge = if m.year() > 2015 { (t - 36.0).max(0.0) * 900.0 } else { 0.0 };
        50_000.0 + t * 400.0 + surge + (t * std::f64::consts::TAU / 12.0).sin() * 3_000.0
    });
    written.extend(repayment.write(
        &actuals_dir.join("actual_total_repayment.csv"),
        &forecasts_dir.join("sarima_forecast_results.csv"),
        Some(&forecasts_dir.join("prophet_total_repayment.csv")),
        &timeline,
        months,
        forecast_from,
        start,
        &mut rng,
        &noise,
    )?);

    // Churn rate: low, seasonal, slowly declining.
    let churn = Series::new("Churn_Rate", 0.003, |m, base| {
        let t = m.signed_duration_since(base).num_days() as f64 / 30.44;
        (0.045 - t * 0.00008 + (t * std::f64::consts::TAU / 12.0).cos() * 0.006).max(0.001)
    });
    written.extend(churn.write(
        &actuals_dir.join("actual_churn_rate.csv"),
        &forecasts_dir.join("forecast_churn_risk.csv"),
        Some(&forecasts_dir.join("prophet_churn_forecast.csv")),
        &timeline,
        months,
        forecast_from,
        start,
        &mut rng,
        &noise,
    )?);

    // Segment loan volumes. "Long-term Sleepers" gets extra volatility.
    for (i, segment) in DEFAULT_SEGMENTS.iter().enumerate() {
        let base = 8_000.0 + i as f64 * 4_000.0;
        let sigma = if *segment == "Long-term Sleepers" { base * 0.12 } else { base * 0.04 };
        let series = Series::new("Loan_Volume", sigma, move |m, start| {
            let t = m.signed_duration_since(start).num_days() as f64 / 30.44;
            base + t * (60.0 + i as f64 * 25.0) + (t * std::f64::consts::TAU / 12.0).sin() * base * 0.05
        });

        let stem = segment_file_stem(segment);
        written.extend(series.write(
            &actuals_dir.join(format!("actual_segment_{stem}.csv")),
            &forecasts_dir.join(format!("forecast_segment_{stem}.csv")),
            None,
            &timeline,
            months,
            forecast_from,
            start,
            &mut rng,
            &noise,
        )?);
    }

    Ok(written)
}

/// One generated series: a trend model plus seeded noise.
struct Series<F: Fn(NaiveDate, NaiveDate) -> f64> {
    value_name: &'static str,
    sigma: f64,
    model: F,
}

impl<F: Fn(NaiveDate, NaiveDate) -> f64> Series<F> {
    fn new(value_name: &'static str, sigma: f64, model: F) -> Self {
        Series { value_name, sigma, model }
    }

    #[allow(clippy::too_many_arguments)]
    fn write(
        &self,
        actual_path: &Path,
        forecast_path: &Path,
        prophet_path: Option<&Path>,
        timeline: &[NaiveDate],
        months: usize,
        forecast_from: usize,
        start: NaiveDate,
        rng: &mut StdRng,
        noise: &Normal<f64>,
    ) -> Result<Vec<PathBuf>, AppError> {
        let mut written = Vec::new();

        // Actuals: model + noise, for the historical range only.
        let mut actual_file = create(actual_path)?;
        writeln!(actual_file, "Month,{}", self.value_name).map_err(write_err(actual_path))?;
        for m in &timeline[..months] {
            let v = (self.model)(*m, start) + noise.sample(rng) * self.sigma;
            writeln!(actual_file, "{},{v:.6}", m.format("%Y-%m-%d")).map_err(write_err(actual_path))?;
        }
        written.push(actual_path.to_path_buf());

        // Forecast: model + small bias; interval widens with lead time.
        let mut rows = Vec::new();
        for (step, m) in timeline[forecast_from..].iter().enumerate() {
            let point = (self.model)(*m, start) * (1.0 + rng.gen_range(-0.01..0.01));
            let half = self.sigma * 1.96 * (1.0 + step as f64).sqrt();
            rows.push((*m, point, point - half, point + half));
        }

        let v = self.value_name;
        let mut forecast_file = create(forecast_path)?;
        writeln!(forecast_file, "Month,{v}_forecast,{v}_lower,{v}_upper")
            .map_err(write_err(forecast_path))?;
        for (m, point, lo, hi) in &rows {
            writeln!(
                forecast_file,
                "{},{point:.6},{lo:.6},{hi:.6}",
                m.format("%Y-%m-%d")
            )
            .map_err(write_err(forecast_path))?;
        }
        written.push(forecast_path.to_path_buf());

        // Prophet copy of the same rows, in ds/yhat naming.
        if let Some(path) = prophet_path {
            let mut prophet_file = create(path)?;
            writeln!(prophet_file, "ds,yhat,yhat_lower,yhat_upper").map_err(write_err(path))?;
            for (m, point, lo, hi) in &rows {
                writeln!(prophet_file, "{},{point:.6},{lo:.6},{hi:.6}", m.format("%Y-%m-%d"))
                    .map_err(write_err(path))?;
            }
            written.push(path.to_path_buf());
        }

        Ok(written)
    }
}

fn create(path: &Path) -> Result<fs::File, AppError> {
    fs::File::create(path)
        .map_err(|e| AppError::input(format!("sample: cannot create {}: {e}", path.display())))
}

fn write_err(path: &Path) -> impl Fn(std::io::Error) -> AppError + '_ {
    move |e| AppError::input(format!("sample: cannot write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{compute_stats, outer_join, ForecastSource, View};
    use crate::io::ingest::load_series_pair;
    use crate::views::{resolve_view, segment_menu};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fo-sample-{}-{tag}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn demo_data_loads_for_every_view_and_source() {
        let dir = temp_dir("views");
        write_demo_data(&dir, 7, 48, 12).unwrap();

        for source in [ForecastSource::Sarima, ForecastSource::Prophet] {
            for (view, segment) in [
                (View::TotalRepayment, None),
                (View::ChurnRisk, None),
                (View::Segments, Some("Long-term Sleepers")),
            ] {
                let plan = resolve_view(view, source, segment, &dir).unwrap();
                let pair = load_series_pair(&plan).unwrap();
                let merged = outer_join(&pair.actual, &pair.forecast);
                let stats = compute_stats(&merged);

                assert_eq!(stats.n_actual, 48, "{view:?}/{source:?}");
                assert_eq!(stats.n_rows, 60, "{view:?}/{source:?}");
                // Every forecast row carries a full interval.
                assert_eq!(stats.n_band, stats.n_forecast, "{view:?}/{source:?}");
                assert!(stats.n_forecast > 12, "{view:?}/{source:?}");
            }
        }
    }

    #[test]
    fn demo_data_populates_segment_menu() {
        let dir = temp_dir("menu");
        write_demo_data(&dir, 1, 24, 6).unwrap();
        assert_eq!(segment_menu(&dir), DEFAULT_SEGMENTS.to_vec());
    }

    #[test]
    fn same_seed_is_reproducible() {
        let a = temp_dir("seed-a");
        let b = temp_dir("seed-b");
        write_demo_data(&a, 42, 24, 6).unwrap();
        write_demo_data(&b, 42, 24, 6).unwrap();

        let fa = fs::read_to_string(a.join("actuals").join("actual_total_repayment.csv")).unwrap();
        let fb = fs::read_to_string(b.join("actuals").join("actual_total_repayment.csv")).unwrap();
        assert_eq!(fa, fb);
    }

    #[test]
    fn too_few_months_is_rejected() {
        let err = write_demo_data(&temp_dir("bad"), 0, 1, 0).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
