//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! One series is drawn as a `-` line through its points; the last point is
//! marked with `*`.

use clap::ValueEnum;

use crate::view::{date_from_day_number, ChartView};

/// Which series of a [`ChartView`] to plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotSeries {
    Close,
    Daily,
    Cumulative,
}

impl PlotSeries {
    pub fn label(self) -> &'static str {
        match self {
            PlotSeries::Close => "close",
            PlotSeries::Daily => "daily return",
            PlotSeries::Cumulative => "cumulative return",
        }
    }

    fn points(self, view: &ChartView) -> &[(f64, f64)] {
        match self {
            PlotSeries::Close => &view.close,
            PlotSeries::Daily => &view.daily,
            PlotSeries::Cumulative => &view.cumulative,
        }
    }
}

/// Render one series of `view` into a `width` x `height` character grid.
pub fn render_ascii_plot(view: &ChartView, series: PlotSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let points = series.points(view);

    let [x_min, x_max] = view.x_bounds;
    let (y_min, y_max) = y_range(points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_series(&mut grid, points, x_min, x_max, y_min, y_max);

    if let Some(&(x, y)) = points.last() {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = '*';
    }

    let span = match (date_from_day_number(x_min), date_from_day_number(x_max)) {
        (Some(a), Some(b)) if !points.is_empty() => format!("{a}..{b}"),
        _ => "no data".to_string(),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} {} | {span} | y=[{y_min:.4}, {y_max:.4}]\n",
        view.ticker,
        series.label()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn y_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if !(min_y.is_finite() && max_y.is_finite()) {
        return None;
    }
    if max_y > min_y {
        Some((min_y, max_y))
    } else {
        Some((min_y - 0.5, max_y + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(grid: &mut [Vec<char>], points: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
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

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::PriceObservation;
    use crate::returns::compute_returns;
    use crate::view::SeriesToggles;

    #[test]
    fn plot_golden_snapshot_small() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 6, day).unwrap();
        let set = compute_returns(&[
            PriceObservation::new(d(1), "X", 100.0, 0),
            PriceObservation::new(d(10), "X", 110.0, 0),
        ]);
        let view = ChartView::build(&set, "X", None, SeriesToggles::default());

        let txt = render_ascii_plot(&view, PlotSeries::Close, 10, 5);
        let expected = concat!(
            "Plot: X close | 2020-06-01..2020-06-10 | y=[99.5000, 110.5000]\n",
            "        -*\n",
            "      --  \n",
            "    --    \n",
            "  --      \n",
            "--        \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_series_renders_blank_grid() {
        let set = compute_returns(&[PriceObservation::new(
            NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            "ONE",
            5.0,
            0,
        )]);
        let view = ChartView::build(&set, "ONE", None, SeriesToggles::default());
        let txt = render_ascii_plot(&view, PlotSeries::Cumulative, 12, 5);
        assert!(txt.starts_with("Plot: ONE cumulative return | no data"));
        assert_eq!(txt.lines().count(), 6);
        assert!(txt.lines().skip(1).all(|l| l.trim().is_empty()));
    }
}
