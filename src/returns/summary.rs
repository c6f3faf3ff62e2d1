//! Per-ticker summary statistics over a computed `ReturnSet`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{ReturnRow, ReturnSet};

use super::ticker_buckets;

/// Headline numbers for one ticker. Every statistic ignores missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub observations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub first_close: f64,
    pub last_close: f64,
    /// Last defined cumulative growth factor minus one.
    pub total_return: Option<f64>,
    pub mean_daily_return: Option<f64>,
    /// Sample standard deviation (n - 1) of the defined daily returns.
    pub daily_volatility: Option<f64>,
    pub best_day: Option<(NaiveDate, f64)>,
    pub worst_day: Option<(NaiveDate, f64)>,
    /// Missing derived values across both return columns (the first row
    /// contributes two).
    pub missing_values: usize,
    pub total_volume: u64,
}

/// Summaries for every ticker in `set`, in `set.tickers` order.
pub fn summarize(set: &ReturnSet) -> Vec<TickerSummary> {
    ticker_buckets(&set.rows, |r| (r.ticker.as_str(), r.date))
        .iter()
        .filter_map(|bucket| {
            let rows: Vec<&ReturnRow> = bucket.iter().map(|&i| &set.rows[i]).collect();
            summarize_rows(&rows)
        })
        .collect()
}

fn summarize_rows(rows: &[&ReturnRow]) -> Option<TickerSummary> {
    let first = rows.first()?;
    let last = rows.last()?;

    let returns: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter_map(|r| r.daily_return.map(|v| (r.date, v)))
        .collect();

    let total_return = rows
        .iter()
        .rev()
        .find_map(|r| r.cumulative_return)
        .map(|g| g - 1.0);

    let (mean, vol) = mean_and_std(returns.iter().map(|&(_, v)| v));

    let best_day = returns
        .iter()
        .copied()
        .fold(None, |best: Option<(NaiveDate, f64)>, cur| match best {
            Some(b) if b.1 >= cur.1 => Some(b),
            _ => Some(cur),
        });
    let worst_day = returns
        .iter()
        .copied()
        .fold(None, |worst: Option<(NaiveDate, f64)>, cur| match worst {
            Some(w) if w.1 <= cur.1 => Some(w),
            _ => Some(cur),
        });

    Some(TickerSummary {
        ticker: first.ticker.clone(),
        observations: rows.len(),
        first_date: first.date,
        last_date: last.date,
        first_close: first.close,
        last_close: last.close,
        total_return,
        mean_daily_return: mean,
        daily_volatility: vol,
        best_day,
        worst_day,
        missing_values: rows
            .iter()
            .map(|r| usize::from(r.daily_return.is_none()) + usize::from(r.cumulative_return.is_none()))
            .sum(),
        total_volume: rows.iter().fold(0u64, |acc, r| acc.saturating_add(r.volume)),
    })
}

fn mean_and_std(values: impl Iterator<Item = f64>) -> (Option<f64>, Option<f64>) {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return (None, None);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (Some(mean), None);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (Some(mean), Some(variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceObservation;
    use crate::returns::compute_returns;

    fn obs(d: u32, ticker: &str, close: f64, volume: u64) -> PriceObservation {
        PriceObservation::new(NaiveDate::from_ymd_opt(2022, 8, d).unwrap(), ticker, close, volume)
    }

    #[test]
    fn summary_of_worked_example() {
        let set = compute_returns(&[
            obs(3, "X", 99.0, 30),
            obs(1, "X", 100.0, 10),
            obs(2, "X", 110.0, 20),
        ]);
        let summaries = summarize(&set);
        assert_eq!(summaries.len(), 1);
        let s = &summaries[0];

        assert_eq!(s.observations, 3);
        assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2022, 8, 1).unwrap());
        assert_eq!(s.last_close, 99.0);
        assert!((s.total_return.unwrap() - (-0.01)).abs() < 1e-12);
        assert!(s.mean_daily_return.unwrap().abs() < 1e-12);
        // Two returns of +/-0.1: sample std = sqrt(0.02).
        assert!((s.daily_volatility.unwrap() - 0.02_f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.best_day.unwrap().0, NaiveDate::from_ymd_opt(2022, 8, 2).unwrap());
        assert_eq!(s.worst_day.unwrap().0, NaiveDate::from_ymd_opt(2022, 8, 3).unwrap());
        assert_eq!(s.missing_values, 2);
        assert_eq!(s.total_volume, 60);
    }

    #[test]
    fn single_row_ticker_has_no_statistics() {
        let set = compute_returns(&[obs(1, "A", 5.0, 1), obs(1, "B", 7.0, 2), obs(2, "B", 7.7, 3)]);
        let summaries = summarize(&set);
        assert_eq!(summaries.len(), 2);

        let a = &summaries[0];
        assert_eq!(a.ticker, "A");
        assert_eq!(a.total_return, None);
        assert_eq!(a.mean_daily_return, None);
        assert_eq!(a.daily_volatility, None);
        assert_eq!(a.best_day, None);

        let b = &summaries[1];
        assert!((b.total_return.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(b.daily_volatility, None);
    }

    #[test]
    fn missing_count_includes_poisoned_cumulative_values() {
        // 0 -> 50 is infinite; 50 -> 60 has a daily return but no cumulative one.
        let set = compute_returns(&[
            obs(1, "P", 100.0, 0),
            obs(2, "P", 0.0, 0),
            obs(3, "P", 50.0, 0),
            obs(4, "P", 60.0, 0),
        ]);
        let s = &summarize(&set)[0];
        // daily: [-, -1.0, -, 0.2]  cumulative: [-, 0.0, -, -]
        assert_eq!(s.missing_values, 5);
        assert!((s.total_return.unwrap() - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn total_return_uses_last_defined_growth() {
        // The last close is NaN, so the final cumulative value is missing.
        let set = compute_returns(&[obs(1, "N", 10.0, 0), obs(2, "N", 12.0, 0), obs(3, "N", f64::NAN, 0)]);
        let s = &summarize(&set)[0];
        assert!((s.total_return.unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(s.missing_values, 4);
    }
}
