//! Plotters-powered overlay chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. This keeps `render()` focused on drawing and makes
/// the data prep testable without a terminal.
pub struct OverlayChart<'a> {
    /// Line series for the actual values.
    pub actual: &'a [(f64, f64)],
    /// Line series for the forecast values.
    pub forecast: &'a [(f64, f64)],
    /// Confidence band as runs of x-sorted `(x, lower, upper)` triples.
    ///
    /// Each run covers consecutive months with both bounds present; months
    /// without bounds separate runs so the fill is never bridged across them.
    pub band_runs: &'a [Vec<(f64, f64, f64)>],
    /// X bounds (months mapped to fractional years).
    pub x_bounds: [f64; 2],
    /// Y bounds (value units depend on the view).
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: String,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for OverlayChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // Mesh lines are disabled to reduce visual clutter in low-resolution
            // terminal rendering; axes + labels are enough for an overlay chart.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Series styling: keep the palette high-contrast for terminal readability.
            let actual_color = WHITE;
            let forecast_color = RGBColor(0, 255, 255); // cyan
            let band_color = RGBColor(255, 165, 0); // orange

            // 1) Confidence band, one polygon per run (upper edge, then lower
            // edge reversed). Drawn first so both line series stay on top.
            // A single-month run has no area, so it degrades to a vertical
            // segment between its bounds.
            for run in self.band_runs {
                match run.as_slice() {
                    [] => {}
                    [(x, lo, hi)] => {
                        chart.draw_series(std::iter::once(PathElement::new(
                            vec![(*x, *lo), (*x, *hi)],
                            band_color.mix(0.3),
                        )))?;
                    }
                    run => {
                        let mut outline: Vec<(f64, f64)> =
                            run.iter().map(|&(x, _, hi)| (x, hi)).collect();
                        outline.extend(run.iter().rev().map(|&(x, lo, _)| (x, lo)));
                        chart.draw_series(std::iter::once(Polygon::new(
                            outline,
                            band_color.mix(0.3).filled(),
                        )))?;
                    }
                }
            }

            // 2) Forecast line.
            chart.draw_series(LineSeries::new(
                self.forecast.iter().copied(),
                &forecast_color,
            ))?;

            // 3) Actual line.
            chart.draw_series(LineSeries::new(self.actual.iter().copied(), &actual_color))?;

            // 4) Per-month markers on both series.
            //
            // We intentionally avoid `Circle` markers here. The underlying
            // `plotters-ratatui-backend` currently maps circle radii incorrectly
            // (pixel radius -> normalized canvas units), producing huge circles.
            // A colored `Pixel` gives a clean dot that reads well in terminals.
            chart.draw_series(
                self.forecast
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), forecast_color)),
            )?;
            chart.draw_series(
                self.actual
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), actual_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
