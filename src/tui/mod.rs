//! Ratatui-based terminal UI.
//!
//! The TUI provides a sidebar for choosing a dashboard view (and, for the
//! segment view, a segment), then renders the actual/forecast overlay chart
//! with its confidence band. The recommendations view is a static text panel.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Terminal,
};

use crate::app::pipeline::ViewOutput;
use crate::cli::ViewArgs;
use crate::domain::{value_axis_label, ForecastSource, View};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::OverlayChart;

/// Start the TUI.
pub fn run(args: ViewArgs) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    data_dir: PathBuf,
    source: ForecastSource,
    selected_view: usize,
    segments: Vec<String>,
    selected_segment: usize,
    status: String,
    output: Option<ViewOutput>,
}

impl App {
    fn new(args: ViewArgs) -> Self {
        let segments = crate::views::segment_menu(&args.data_dir);
        let selected_segment = args
            .segment
            .as_deref()
            .and_then(|s| segments.iter().position(|name| name == s))
            .unwrap_or(0);
        let selected_view = View::ALL
            .iter()
            .position(|v| *v == args.view)
            .unwrap_or(0);

        let mut app = Self {
            data_dir: args.data_dir,
            source: args.source,
            selected_view,
            segments,
            selected_segment,
            status: String::new(),
            output: None,
        };
        app.reload();
        app
    }

    fn current_view(&self) -> View {
        View::ALL[self.selected_view]
    }

    fn current_segment(&self) -> Option<&str> {
        self.segments.get(self.selected_segment).map(|s| s.as_str())
    }

    /// Re-resolve and re-read the current selection from disk.
    ///
    /// Load failures land in the status line; the app stays interactive so the
    /// user can switch views or sources.
    fn reload(&mut self) {
        let view = self.current_view();

        if view == View::Recommendations {
            self.output = None;
            self.status = "Static panel (no data files).".to_string();
            return;
        }

        let plan = crate::views::resolve_view(
            view,
            self.source,
            self.current_segment(),
            &self.data_dir,
        );
        match plan.and_then(|plan| crate::app::pipeline::run_view(&plan)) {
            Ok(out) => {
                self.status = format!(
                    "{}: {} rows ({} actual, {} forecast)",
                    self.source.display_name(),
                    out.stats.n_rows,
                    out.stats.n_actual,
                    out.stats.n_forecast,
                );
                self.output = Some(out);
            }
            Err(err) => {
                self.output = None;
                self.status = err.to_string();
            }
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                if self.selected_view > 0 {
                    self.selected_view -= 1;
                    self.reload();
                }
            }
            KeyCode::Down => {
                if self.selected_view + 1 < View::ALL.len() {
                    self.selected_view += 1;
                    self.reload();
                }
            }
            KeyCode::Left => {
                if self.current_view() == View::Segments && !self.segments.is_empty() {
                    self.selected_segment =
                        (self.selected_segment + self.segments.len() - 1) % self.segments.len();
                    self.reload();
                }
            }
            KeyCode::Right => {
                if self.current_view() == View::Segments && !self.segments.is_empty() {
                    self.selected_segment = (self.selected_segment + 1) % self.segments.len();
                    self.reload();
                }
            }
            KeyCode::Char('p') => {
                self.source = self.source.toggle();
                self.reload();
            }
            KeyCode::Char('r') => {
                // Also re-scan the segment menu in case files appeared.
                self.segments = crate::views::segment_menu(&self.data_dir);
                if self.selected_segment >= self.segments.len() {
                    self.selected_segment = 0;
                }
                self.reload();
            }
            _ => {}
        }

        false
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("fo", Style::default().fg(Color::Cyan)),
            Span::raw(" — Forecast Overlay Dashboard"),
        ]));

        let months = self
            .output
            .as_ref()
            .and_then(|out| match (out.stats.month_min, out.stats.month_max) {
                (Some(lo), Some(hi)) => {
                    Some(format!("{} → {}", lo.format("%Y-%m"), hi.format("%Y-%m")))
                }
                _ => None,
            })
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "view: {} | source: {} | data: {} | months: {months}",
                self.current_view().display_name(),
                self.source.display_name(),
                self.data_dir.display(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        self.draw_sidebar(frame, chunks[0]);
        self.draw_panel(frame, chunks[1]);
    }

    fn draw_sidebar(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(View::ALL.len() as u16 + 2),
                Constraint::Min(0),
            ])
            .split(area);

        let view_items: Vec<ListItem> = View::ALL
            .iter()
            .map(|v| ListItem::new(v.display_name()))
            .collect();
        let views = List::new(view_items)
            .block(Block::default().title("Views").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut view_state = ratatui::widgets::ListState::default();
        view_state.select(Some(self.selected_view));
        frame.render_stateful_widget(views, chunks[0], &mut view_state);

        let segment_items: Vec<ListItem> = self
            .segments
            .iter()
            .map(|s| ListItem::new(s.as_str()))
            .collect();
        let mut segments = List::new(segment_items)
            .block(Block::default().title("Segments").borders(Borders::ALL));
        if self.current_view() == View::Segments {
            segments = segments
                .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
                .highlight_symbol("» ");
        }
        let mut segment_state = ratatui::widgets::ListState::default();
        if self.current_view() == View::Segments {
            segment_state.select(Some(self.selected_segment));
        }
        frame.render_stateful_widget(segments, chunks[1], &mut segment_state);
    }

    fn draw_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if self.current_view() == View::Recommendations {
            let p = Paragraph::new(crate::views::RECOMMENDATIONS)
                .wrap(Wrap { trim: false })
                .block(Block::default().title("Recommendations").borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        }

        let title = self
            .output
            .as_ref()
            .map(|out| out.plan.title.clone())
            .unwrap_or_else(|| self.current_view().display_name().to_string());
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(out) = &self.output else {
            let msg = Paragraph::new(self.status.as_str())
                .style(Style::default().fg(Color::Yellow))
                .wrap(Wrap { trim: false });
            frame.render_widget(msg, inner);
            return;
        };

        let Some(series) = chart_series(out) else {
            let msg = Paragraph::new("No plottable rows in this view.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let (chart_rect, insets) = chart_layout(inner);
        let widget = OverlayChart {
            actual: &series.actual,
            forecast: &series.forecast,
            band_runs: &series.band_runs,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: "Month",
            y_label: value_axis_label(&out.plan.value_name),
            fmt_x: fmt_axis_month,
            fmt_y: fmt_axis_value,
        };

        frame.render_widget(widget, chart_rect);
        draw_legend(frame, inner, !series.band_runs.is_empty());
        if let Some(insets) = insets {
            draw_axis_ticks(
                frame,
                inner,
                chart_rect,
                insets,
                &out.plan.value_name,
                series.x_bounds,
                series.y_bounds,
            );
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ view  ←/→ segment  p source  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Chart-ready series for Plotters.
struct ChartSeries {
    actual: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
    /// Confidence band, split into runs of consecutive months. A month whose
    /// bounds are absent breaks the run, so the fill never bridges the gap.
    band_runs: Vec<Vec<(f64, f64, f64)>>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series from the merged rows. Returns `None` when nothing is plottable.
fn chart_series(out: &ViewOutput) -> Option<ChartSeries> {
    let mut actual = Vec::new();
    let mut forecast = Vec::new();
    let mut band_runs: Vec<Vec<(f64, f64, f64)>> = Vec::new();
    let mut prev_band_idx: Option<usize> = None;

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut track = |y: f64| {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    };

    for (i, row) in out.merged.iter().enumerate() {
        let x = month_to_x(row.month);
        if let Some(v) = row.actual {
            actual.push((x, v));
            track(v);
        }
        if let Some(v) = row.forecast {
            forecast.push((x, v));
            track(v);
        }
        if let Some((lo, hi)) = row.band() {
            match band_runs.last_mut() {
                Some(run) if prev_band_idx == Some(i - 1) => run.push((x, lo, hi)),
                _ => band_runs.push(vec![(x, lo, hi)]),
            }
            prev_band_idx = Some(i);
            track(lo);
            track(hi);
        }
    }

    if actual.is_empty() && forecast.is_empty() {
        return None;
    }

    let first = out.merged.first()?.month;
    let last = out.merged.last()?.month;
    let mut x0 = month_to_x(first);
    let mut x1 = month_to_x(last);
    if x1 <= x0 {
        // Single-month series: pad by one month either side.
        x0 -= 1.0 / 12.0;
        x1 += 1.0 / 12.0;
    }

    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = y_min.min(0.0);
        y_max = y_min + 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some(ChartSeries {
        actual,
        forecast,
        band_runs,
        x_bounds: [x0, x1],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

/// Map a month to a fractional-year x coordinate (2021-07 -> 2021.5).
fn month_to_x(month: NaiveDate) -> f64 {
    month.year() as f64 + (month.month() - 1) as f64 / 12.0
}

/// Format a fractional-year x coordinate as the nearest `YYYY-MM`.
fn fmt_axis_month(v: f64) -> String {
    let year = v.floor();
    let mut y = year as i32;
    let mut m = ((v - year) * 12.0).round() as i64 + 1;
    if m > 12 {
        y += 1;
        m -= 12;
    }
    format!("{y}-{m:02}")
}

/// Value tick labels: more precision for small magnitudes (e.g. churn rates).
fn fmt_axis_value(v: f64) -> String {
    if v.abs() < 1.0 {
        format!("{v:.3}")
    } else if v.abs() < 1000.0 {
        format!("{v:.1}")
    } else {
        format!("{v:.0}")
    }
}

/// One-line legend across the top of the chart panel. The band entry is only
/// shown when the current series actually has a band.
fn draw_legend(frame: &mut ratatui::Frame<'_>, inner: Rect, has_band: bool) {
    if inner.height == 0 {
        return;
    }

    let mut spans = vec![
        Span::styled("── actual", Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled("── forecast", Style::default().fg(Color::Cyan)),
    ];
    if has_band {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            "▒▒ confidence band",
            Style::default().fg(Color::Rgb(255, 165, 0)),
        ));
    }

    let legend = Paragraph::new(Line::from(spans)).alignment(Alignment::Right);
    let rect = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width,
        height: 1,
    };
    frame.render_widget(legend, rect);
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    value_name: &str,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_axis_month(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_axis_value(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("Month")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(value_axis_label(value_name))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastSource, MergeStats, MergedRow, View, ViewPlan};
    use crate::domain::SeriesPair;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn month_axis_mapping_round_trips() {
        assert_eq!(month_to_x(ymd(2021, 1)), 2021.0);
        assert_eq!(month_to_x(ymd(2021, 7)), 2021.5);

        assert_eq!(fmt_axis_month(2021.0), "2021-01");
        assert_eq!(fmt_axis_month(2021.5), "2021-07");
        // Ticks just under a year boundary roll forward.
        assert_eq!(fmt_axis_month(2021.97), "2022-01");
    }

    #[test]
    fn value_ticks_scale_precision() {
        assert_eq!(fmt_axis_value(0.0452), "0.045");
        assert_eq!(fmt_axis_value(97.2), "97.2");
        assert_eq!(fmt_axis_value(52_341.7), "52342");
    }

    fn output_with(merged: Vec<MergedRow>) -> ViewOutput {
        let stats = crate::domain::compute_stats(&merged);
        ViewOutput {
            plan: ViewPlan {
                view: View::TotalRepayment,
                source: ForecastSource::Sarima,
                title: "Total Repayment: Actual vs Forecast".to_string(),
                value_name: "Repayment".to_string(),
                actual_path: "a.csv".into(),
                forecast_path: "f.csv".into(),
            },
            pair: SeriesPair {
                value_name: "Repayment".to_string(),
                actual: Vec::new(),
                forecast: Vec::new(),
            },
            stats,
            merged,
        }
    }

    fn row(month: NaiveDate, actual: Option<f64>, forecast: Option<f64>, lower: Option<f64>, upper: Option<f64>) -> MergedRow {
        MergedRow { month, actual, forecast, lower, upper }
    }

    #[test]
    fn chart_series_splits_band_and_lines() {
        let out = output_with(vec![
            row(ymd(2021, 1), Some(100.0), None, None, None),
            row(ymd(2021, 2), Some(110.0), Some(105.0), Some(95.0), Some(115.0)),
        ]);

        let series = chart_series(&out).unwrap();
        assert_eq!(series.actual.len(), 2);
        assert_eq!(series.forecast.len(), 1);
        assert_eq!(series.band_runs.len(), 1);
        assert_eq!(series.band_runs[0], vec![(month_to_x(ymd(2021, 2)), 95.0, 115.0)]);
        // Band extremes widen the y bounds.
        assert!(series.y_bounds[0] < 95.0);
        assert!(series.y_bounds[1] > 115.0);
        assert_eq!(series.x_bounds, [2021.0, month_to_x(ymd(2021, 2))]);
    }

    #[test]
    fn band_gap_month_starts_a_new_run() {
        // Feb and Apr carry bounds; Mar has a forecast but blank bound cells.
        // The fill must not bridge March.
        let out = output_with(vec![
            row(ymd(2021, 2), None, Some(105.0), Some(95.0), Some(115.0)),
            row(ymd(2021, 3), None, Some(112.0), None, None),
            row(ymd(2021, 4), None, Some(120.0), Some(110.0), Some(130.0)),
        ]);

        let series = chart_series(&out).unwrap();
        assert_eq!(series.band_runs.len(), 2);
        assert_eq!(series.band_runs[0], vec![(month_to_x(ymd(2021, 2)), 95.0, 115.0)]);
        assert_eq!(series.band_runs[1], vec![(month_to_x(ymd(2021, 4)), 110.0, 130.0)]);
    }

    #[test]
    fn consecutive_band_months_stay_in_one_run() {
        let out = output_with(vec![
            row(ymd(2021, 1), Some(100.0), None, None, None),
            row(ymd(2021, 2), None, Some(105.0), Some(95.0), Some(115.0)),
            row(ymd(2021, 3), None, Some(120.0), Some(110.0), Some(130.0)),
        ]);

        let series = chart_series(&out).unwrap();
        assert_eq!(series.band_runs.len(), 1);
        assert_eq!(series.band_runs[0].len(), 2);
        assert_eq!(series.band_runs[0][1], (month_to_x(ymd(2021, 3)), 110.0, 130.0));
    }
}
