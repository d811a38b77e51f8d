//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - actual values: `o` markers on a `-` line
//! - forecast values: `x` markers on a `-` line
//! - confidence band: `.` fill between lower and upper bounds

use crate::domain::{value_axis_label, MergedFile, MergedRow};

/// Render an overlay plot for a merged actual/forecast series.
pub fn render_overlay_plot(rows: &[MergedRow], value_name: &str, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    if rows.is_empty() {
        return "(empty series)\n".to_string();
    }

    let (y_min, y_max) = y_range(rows).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Band first, so lines and markers can overlay it.
    for (i, row) in rows.iter().enumerate() {
        let Some((lo, hi)) = row.band() else { continue };
        let x = map_x(i, rows.len(), width);
        let y_top = map_y(hi, y_min, y_max, height);
        let y_bot = map_y(lo, y_min, y_max, height);
        for cell in grid.iter_mut().take(y_bot + 1).skip(y_top) {
            if cell[x] == ' ' {
                cell[x] = '.';
            }
        }
    }

    let forecast_pts = series_points(rows, width, height, y_min, y_max, |r| r.forecast);
    let actual_pts = series_points(rows, width, height, y_min, y_max, |r| r.actual);

    draw_polyline(&mut grid, &forecast_pts);
    draw_polyline(&mut grid, &actual_pts);

    for &(x, y) in &actual_pts {
        grid[y][x] = 'o';
    }
    for &(x, y) in &forecast_pts {
        grid[y][x] = 'x';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: month=[{}, {}] | {}=[{y_min:.2}, {y_max:.2}]\n",
        rows[0].month.format("%Y-%m"),
        rows[rows.len() - 1].month.format("%Y-%m"),
        value_axis_label(value_name),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Render from a saved merged-series JSON file.
pub fn render_overlay_from_file(merged: &MergedFile, width: usize, height: usize) -> String {
    render_overlay_plot(&merged.rows, &merged.value_name, width, height)
}

fn series_points(
    rows: &[MergedRow],
    width: usize,
    height: usize,
    y_min: f64,
    y_max: f64,
    pick: impl Fn(&MergedRow) -> Option<f64>,
) -> Vec<(usize, usize)> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, r)| {
            pick(r).map(|v| (map_x(i, rows.len(), width), map_y(v, y_min, y_max, height)))
        })
        .collect()
}

fn y_range(rows: &[MergedRow]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for r in rows {
        for v in [r.actual, r.forecast, r.lower, r.upper].into_iter().flatten() {
            min_y = min_y.min(v);
            max_y = max_y.max(v);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Degenerate: all values equal.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(idx: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = idx as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], points: &[(usize, usize)]) {
    if points.len() < 2 {
        return;
    }
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        draw_line(grid, x0, y0, x1, y1, '-');
    }
}

/// Integer line drawing (Bresenham-ish). Writes over blanks and band fill,
/// never over markers.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && matches!(grid[y0 as usize][x0 as usize], ' ' | '.')
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
