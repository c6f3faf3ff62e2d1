//! Chart view selection.
//!
//! Given a computed `ReturnSet`, a ticker, and a year range, build the series
//! the chart draws. Missing derived values are dropped from their series here,
//! so nothing downstream ever sees a gap marker or a non-finite value.

use chrono::{Datelike, NaiveDate};

use crate::domain::{ReturnRow, ReturnSet, YearRange};

/// Which series are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesToggles {
    pub close: bool,
    pub daily: bool,
    pub cumulative: bool,
    pub volume: bool,
}

impl Default for SeriesToggles {
    fn default() -> Self {
        Self {
            close: true,
            daily: true,
            cumulative: true,
            volume: true,
        }
    }
}

/// Series for one ticker, x in days since the Unix epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartView {
    pub ticker: String,
    pub range: Option<YearRange>,
    pub close: Vec<(f64, f64)>,
    pub daily: Vec<(f64, f64)>,
    pub cumulative: Vec<(f64, f64)>,
    pub volume: Vec<(f64, f64)>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub volume_max: f64,
}

impl ChartView {
    /// Select `ticker` rows inside `range` and derive bounds for the visible series.
    pub fn build(set: &ReturnSet, ticker: &str, range: Option<YearRange>, toggles: SeriesToggles) -> Self {
        let mut rows: Vec<&ReturnRow> = set
            .rows
            .iter()
            .filter(|r| r.ticker == ticker)
            .filter(|r| range.is_none_or(|yr| yr.contains(r.year())))
            .collect();
        rows.sort_by_key(|r| r.date);

        let mut view = ChartView {
            ticker: ticker.to_string(),
            range,
            first_date: rows.first().map(|r| r.date),
            last_date: rows.last().map(|r| r.date),
            ..Default::default()
        };

        for r in &rows {
            let x = day_number(r.date);
            if r.close.is_finite() {
                view.close.push((x, r.close));
            }
            if let Some(v) = r.daily_return.filter(|v| v.is_finite()) {
                view.daily.push((x, v));
            }
            if let Some(v) = r.cumulative_return.filter(|v| v.is_finite()) {
                view.cumulative.push((x, v));
            }
            view.volume.push((x, r.volume as f64));
        }

        view.x_bounds = x_bounds(view.first_date, view.last_date);
        view.y_bounds = y_bounds(&view, toggles);
        view.volume_max = view
            .volume
            .iter()
            .map(|&(_, v)| v)
            .fold(0.0, f64::max)
            .max(1.0);
        view
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Most recent defined cumulative growth factor in the view.
    pub fn last_cumulative(&self) -> Option<f64> {
        self.cumulative.last().map(|&(_, v)| v)
    }
}

/// Days since 1970-01-01 as a chart x coordinate.
pub fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64 - EPOCH_DAYS_FROM_CE
}

/// Inverse of [`day_number`] (rounded to the nearest day).
pub fn date_from_day_number(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    let days = (x.round() + EPOCH_DAYS_FROM_CE) as i32;
    NaiveDate::from_num_days_from_ce_opt(days)
}

const EPOCH_DAYS_FROM_CE: f64 = 719_163.0;

fn x_bounds(first: Option<NaiveDate>, last: Option<NaiveDate>) -> [f64; 2] {
    match (first, last) {
        (Some(a), Some(b)) if b > a => [day_number(a), day_number(b)],
        (Some(a), _) => {
            let x = day_number(a);
            [x - 1.0, x + 1.0]
        }
        _ => [0.0, 1.0],
    }
}

fn y_bounds(view: &ChartView, toggles: SeriesToggles) -> [f64; 2] {
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let visible = [
        (toggles.close, &view.close),
        (toggles.daily, &view.daily),
        (toggles.cumulative, &view.cumulative),
    ];
    for (on, series) in visible {
        if !on {
            continue;
        }
        for &(_, y) in series.iter() {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !y_min.is_finite() || !y_max.is_finite() {
        return [0.0, 1.0];
    }
    if y_max <= y_min {
        let pad = (y_min.abs() * 0.05).max(0.5);
        return [y_min - pad, y_max + pad];
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min - pad, y_max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceObservation;
    use crate::returns::compute_returns;

    fn set() -> ReturnSet {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        compute_returns(&[
            PriceObservation::new(d(2019, 12, 31), "X", 0.0, 5),
            PriceObservation::new(d(2020, 1, 2), "X", 50.0, 7),
            PriceObservation::new(d(2020, 1, 3), "X", 55.0, 9),
            PriceObservation::new(d(2021, 1, 4), "X", 60.5, 3),
            PriceObservation::new(d(2020, 1, 2), "Y", 10.0, 100),
        ])
    }

    #[test]
    fn filters_by_ticker_and_year_range() {
        let view = ChartView::build(&set(), "X", Some(YearRange::new(2020, 2020)), SeriesToggles::default());
        assert_eq!(view.close.len(), 2);
        assert_eq!(view.first_date, NaiveDate::from_ymd_opt(2020, 1, 2));
        assert_eq!(view.last_date, NaiveDate::from_ymd_opt(2020, 1, 3));
        assert_eq!(view.volume_max, 9.0);
    }

    #[test]
    fn missing_values_never_reach_series_or_bounds() {
        let view = ChartView::build(&set(), "X", None, SeriesToggles::default());
        // 0 -> 50 is infinite: that row has no daily/cumulative point.
        assert_eq!(view.close.len(), 4);
        assert_eq!(view.daily.len(), 2);
        assert!(view.cumulative.is_empty());
        assert!(view.y_bounds.iter().all(|v| v.is_finite()));
        assert!(view.y_bounds[0] < view.y_bounds[1]);
    }

    #[test]
    fn empty_selection_has_safe_bounds() {
        let view = ChartView::build(&set(), "NOPE", None, SeriesToggles::default());
        assert!(view.is_empty());
        assert_eq!(view.x_bounds, [0.0, 1.0]);
        assert_eq!(view.y_bounds, [0.0, 1.0]);
        assert_eq!(view.volume_max, 1.0);
    }

    #[test]
    fn single_point_selection_is_padded() {
        let view = ChartView::build(&set(), "Y", None, SeriesToggles::default());
        assert!(view.x_bounds[0] < view.x_bounds[1]);
        assert!(view.y_bounds[0] < 10.0 && view.y_bounds[1] > 10.0);
    }

    #[test]
    fn hidden_series_do_not_shape_bounds() {
        let toggles = SeriesToggles {
            close: false,
            ..SeriesToggles::default()
        };
        let view = ChartView::build(&set(), "X", None, toggles);
        // Only daily returns (0.1 and 0.1) remain visible.
        assert!(view.y_bounds[1] < 1.0);
    }

    #[test]
    fn day_numbers_round_trip() {
        let d = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(day_number(d), 0.0);
        let d = NaiveDate::from_ymd_opt(2023, 12, 29).unwrap();
        assert_eq!(date_from_day_number(day_number(d)), Some(d));
    }
}
