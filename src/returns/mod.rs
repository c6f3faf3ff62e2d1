//! Daily and cumulative return calculation.
//!
//! The calculator is a grouped fold:
//!
//! 1. partition row indices by ticker (first-appearance order)
//! 2. stable-sort each bucket by date
//! 3. scan each bucket left to right, carrying the previous close and the
//!    running growth factor
//! 4. rewrite every non-finite derived value to `None`
//!
//! Output rows keep the input order and length; nothing is dropped.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::domain::{PriceObservation, ReturnRow, ReturnSet};

pub mod summary;

pub use summary::{summarize, TickerSummary};

/// Augment `observations` with daily and cumulative returns.
///
/// Input order is irrelevant to the result values: chronology is re-established
/// per ticker. Calling this twice on the same input yields identical output.
pub fn compute_returns(observations: &[PriceObservation]) -> ReturnSet {
    let n = observations.len();
    let mut daily: Vec<Option<f64>> = vec![None; n];
    let mut cumulative: Vec<Option<f64>> = vec![None; n];

    let buckets = ticker_buckets(observations, |o| (o.ticker.as_str(), o.date));
    for bucket in &buckets {
        scan_bucket(observations, bucket, &mut daily, &mut cumulative);
    }

    normalize_non_finite(&mut daily);
    normalize_non_finite(&mut cumulative);

    let tickers = buckets
        .iter()
        .filter_map(|b| b.first())
        .map(|&i| observations[i].ticker.clone())
        .collect();

    let rows = observations
        .iter()
        .zip(daily)
        .zip(cumulative)
        .map(|((o, daily_return), cumulative_return)| ReturnRow {
            date: o.date,
            ticker: o.ticker.clone(),
            close: o.close,
            volume: o.volume,
            daily_return,
            cumulative_return,
        })
        .collect();

    ReturnSet {
        rows,
        tickers,
        years: year_bounds(observations.iter().map(|o| o.date)),
    }
}

/// Replace every `Some(±inf)` / `Some(NaN)` with `None`.
pub fn normalize_non_finite(column: &mut [Option<f64>]) {
    for v in column.iter_mut() {
        if matches!(v, Some(x) if !x.is_finite()) {
            *v = None;
        }
    }
}

/// `(min_year, max_year)` over a set of dates.
pub fn year_bounds(dates: impl IntoIterator<Item = NaiveDate>) -> Option<(i32, i32)> {
    dates.into_iter().fold(None, |acc, d| {
        let y = d.year();
        Some(match acc {
            None => (y, y),
            Some((lo, hi)) => (lo.min(y), hi.max(y)),
        })
    })
}

/// Group item indices by ticker, each group in chronological order.
///
/// Groups appear in first-appearance order of their ticker. The per-group sort
/// is stable, so rows sharing a date keep their input order.
pub(crate) fn ticker_buckets<T, F>(items: &[T], key: F) -> Vec<Vec<usize>>
where
    F: Fn(&T) -> (&str, NaiveDate),
{
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Vec<usize>> = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let (ticker, _) = key(item);
        let b = *slot.entry(ticker).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[b].push(idx);
    }

    for bucket in &mut buckets {
        bucket.sort_by_key(|&i| key(&items[i]).1);
    }
    buckets
}

fn scan_bucket(
    observations: &[PriceObservation],
    bucket: &[usize],
    daily: &mut [Option<f64>],
    cumulative: &mut [Option<f64>],
) {
    let mut prev_close: Option<f64> = None;
    let mut growth = 1.0_f64;

    for &i in bucket {
        let close = observations[i].close;
        if let Some(prev) = prev_close {
            let r = (close - prev) / prev;
            daily[i] = Some(r);
            // NaN (0/0, NaN close) leaves the running product alone; an
            // infinity poisons it for the rest of the ticker.
            if !r.is_nan() {
                growth *= 1.0 + r;
                cumulative[i] = Some(growth);
            }
        }
        prev_close = Some(close);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    fn obs(d: u32, ticker: &str, close: f64) -> PriceObservation {
        PriceObservation::new(day(d), ticker, close, 1_000)
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-12)
    }

    #[test]
    fn worked_example_rise_then_fall() {
        let input = vec![obs(1, "X", 100.0), obs(2, "X", 110.0), obs(3, "X", 99.0)];
        let set = compute_returns(&input);

        let d: Vec<_> = set.rows.iter().map(|r| r.daily_return).collect();
        let c: Vec<_> = set.rows.iter().map(|r| r.cumulative_return).collect();

        assert_eq!(d[0], None);
        assert!(approx(d[1], 0.10));
        assert!(approx(d[2], -0.10));
        assert_eq!(c[0], None);
        assert!(approx(c[1], 1.10));
        assert!(approx(c[2], 0.99));
    }

    #[test]
    fn zero_prior_close_becomes_missing() {
        let input = vec![obs(1, "Y", 0.0), obs(2, "Y", 50.0)];
        let set = compute_returns(&input);
        for row in &set.rows {
            assert_eq!(row.daily_return, None);
            assert_eq!(row.cumulative_return, None);
        }
    }

    #[test]
    fn infinity_poisons_later_cumulative_values() {
        let input = vec![obs(1, "Y", 0.0), obs(2, "Y", 50.0), obs(3, "Y", 55.0)];
        let set = compute_returns(&input);
        assert!(approx(set.rows[2].daily_return, 0.10));
        assert_eq!(set.rows[2].cumulative_return, None);
    }

    #[test]
    fn nan_return_is_skipped_by_running_product() {
        // 0 -> 0 is 0/0: missing, but the product carries on from the prior basis.
        let input = vec![
            obs(1, "Z", 10.0),
            obs(2, "Z", 0.0),
            obs(3, "Z", 0.0),
            obs(4, "Z", 5.0),
        ];
        let set = compute_returns(&input);
        assert!(approx(set.rows[1].daily_return, -1.0));
        assert!(approx(set.rows[1].cumulative_return, 0.0));
        assert_eq!(set.rows[2].daily_return, None);
        assert_eq!(set.rows[2].cumulative_return, None);
        // 5/0 is +inf: daily and cumulative are both missing.
        assert_eq!(set.rows[3].daily_return, None);
        assert_eq!(set.rows[3].cumulative_return, None);
    }

    #[test]
    fn single_observation_ticker_is_all_missing() {
        let set = compute_returns(&[obs(1, "ONE", 42.0)]);
        assert_eq!(set.rows.len(), 1);
        assert_eq!(set.rows[0].daily_return, None);
        assert_eq!(set.rows[0].cumulative_return, None);
        assert_eq!(set.tickers, vec!["ONE".to_string()]);
    }

    #[test]
    fn empty_input_gives_empty_set() {
        let set = compute_returns(&[]);
        assert!(set.is_empty());
        assert!(set.tickers.is_empty());
        assert_eq!(set.years, None);
    }

    #[test]
    fn interleaved_unsorted_input_matches_sorted_per_ticker() {
        let sorted = vec![
            obs(1, "A", 10.0),
            obs(2, "A", 11.0),
            obs(3, "A", 12.1),
            obs(1, "B", 50.0),
            obs(2, "B", 25.0),
        ];
        let shuffled = vec![
            sorted[4].clone(),
            sorted[2].clone(),
            sorted[3].clone(),
            sorted[0].clone(),
            sorted[1].clone(),
        ];

        let a = compute_returns(&sorted);
        let b = compute_returns(&shuffled);

        // Same rows, input order preserved.
        assert_eq!(b.rows.len(), shuffled.len());
        for (row, o) in b.rows.iter().zip(&shuffled) {
            assert_eq!(row.date, o.date);
            assert_eq!(row.ticker, o.ticker);
        }

        for row in &b.rows {
            let twin = a
                .rows
                .iter()
                .find(|r| r.ticker == row.ticker && r.date == row.date)
                .unwrap();
            assert_eq!(twin, row);
        }

        assert_eq!(b.tickers, vec!["B".to_string(), "A".to_string()]);
        let b_day2 = b.rows.iter().find(|r| r.ticker == "B" && r.date == day(2)).unwrap();
        assert!(approx(b_day2.daily_return, -0.5));
    }

    #[test]
    fn cumulative_is_product_of_one_plus_daily() {
        let closes = [20.0, 21.0, 19.5, 19.5, 23.0, 22.1];
        let input: Vec<_> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| obs(i as u32 + 1, "P", c))
            .collect();
        let set = compute_returns(&input);

        let mut product = 1.0;
        for i in 1..closes.len() {
            let expected_daily = (closes[i] - closes[i - 1]) / closes[i - 1];
            assert!(approx(set.rows[i].daily_return, expected_daily));
            product *= 1.0 + expected_daily;
            assert!((set.rows[i].cumulative_return.unwrap() - product).abs() < 1e-12);
        }
        // Growth of one unit equals last / first close.
        let last = set.rows.last().unwrap().cumulative_return.unwrap();
        assert!((last - 22.1 / 20.0).abs() < 1e-12);
    }

    #[test]
    fn rerun_is_identical() {
        let input = vec![obs(2, "Q", 3.0), obs(1, "Q", 0.0), obs(3, "Q", 4.5), obs(1, "R", 7.0)];
        assert_eq!(compute_returns(&input), compute_returns(&input));
    }

    #[test]
    fn no_infinities_survive() {
        let input = vec![
            obs(1, "N", 0.0),
            obs(2, "N", -3.0),
            obs(3, "N", 0.0),
            obs(4, "N", 8.0),
            obs(5, "N", f64::NAN),
            obs(6, "N", 1.0),
        ];
        let set = compute_returns(&input);
        for row in &set.rows {
            assert!(row.daily_return.is_none_or(f64::is_finite));
            assert!(row.cumulative_return.is_none_or(f64::is_finite));
        }
    }

    #[test]
    fn year_bounds_span_all_rows() {
        let input = vec![
            PriceObservation::new(NaiveDate::from_ymd_opt(2015, 6, 1).unwrap(), "A", 1.0, 0),
            PriceObservation::new(NaiveDate::from_ymd_opt(2011, 1, 3).unwrap(), "B", 1.0, 0),
            PriceObservation::new(NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(), "A", 1.0, 0),
        ];
        assert_eq!(compute_returns(&input).years, Some((2011, 2019)));
    }

    #[test]
    fn same_day_duplicates_keep_input_order() {
        let input = vec![obs(1, "D", 10.0), obs(1, "D", 20.0), obs(2, "D", 10.0)];
        let set = compute_returns(&input);
        assert_eq!(set.rows[0].daily_return, None);
        assert!(approx(set.rows[1].daily_return, 1.0));
        assert!(approx(set.rows[2].daily_return, -0.5));
    }
}
