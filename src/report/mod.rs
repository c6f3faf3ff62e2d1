//! Reporting utilities: performance leaders and formatted terminal output.

use std::cmp::Ordering;

use crate::returns::TickerSummary;

mod format;

pub use format::*;

/// Best and worst tickers by total return (top-N each side).
#[derive(Debug, Clone)]
pub struct Leaders {
    pub best: Vec<TickerSummary>,
    pub worst: Vec<TickerSummary>,
}

/// Rank tickers by total return. Tickers without a total return are left out.
pub fn rank_by_total_return(summaries: &[TickerSummary], top_n: usize) -> Leaders {
    let mut ranked: Vec<&TickerSummary> = summaries.iter().filter(|s| s.total_return.is_some()).collect();
    ranked.sort_by(|a, b| {
        b.total_return
            .partial_cmp(&a.total_return)
            .unwrap_or(Ordering::Equal)
    });

    let best = ranked.iter().take(top_n).map(|s| (*s).clone()).collect();
    let worst = ranked.iter().rev().take(top_n).map(|s| (*s).clone()).collect();

    Leaders { best, worst }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::PriceObservation;
    use crate::returns::{compute_returns, summarize};

    #[test]
    fn leaders_sorted_both_ways() {
        let d = |day| NaiveDate::from_ymd_opt(2018, 4, day).unwrap();
        let set = compute_returns(&[
            PriceObservation::new(d(2), "UP", 10.0, 0),
            PriceObservation::new(d(3), "UP", 15.0, 0),
            PriceObservation::new(d(2), "FLAT", 10.0, 0),
            PriceObservation::new(d(3), "FLAT", 10.0, 0),
            PriceObservation::new(d(2), "DOWN", 10.0, 0),
            PriceObservation::new(d(3), "DOWN", 5.0, 0),
            PriceObservation::new(d(2), "LONE", 10.0, 0),
        ]);
        let leaders = rank_by_total_return(&summarize(&set), 2);

        let best: Vec<&str> = leaders.best.iter().map(|s| s.ticker.as_str()).collect();
        let worst: Vec<&str> = leaders.worst.iter().map(|s| s.ticker.as_str()).collect();
        assert_eq!(best, vec!["UP", "FLAT"]);
        assert_eq!(worst, vec!["DOWN", "FLAT"]);
    }
}
