//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the return calculator and the dashboard
//! - written to / read from the CSV cache
//! - exported to JSON for downstream scripts

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Individual equities offered under [`Category::Stocks`].
pub const STOCK_TICKERS: [&str; 20] = [
    "NVDA", "MSFT", "META", "PANW", "TSLA", "AAPL", "PEP", "JPM", "AMZN", "GOOG", "MMM", "DIS",
    "CVS", "PYPL", "KO", "BB", "AMC", "BTE", "APE", "IQ",
];

/// S&P 500 Select Sector SPDR ETFs offered under [`Category::SectorEtfs`].
pub const SECTOR_ETF_TICKERS: [&str; 9] = [
    "XLY", "XLP", "XLE", "XLF", "XLV", "XLI", "XLK", "XLB", "XLU",
];

/// Human-readable sector for a sector ETF ticker.
pub fn sector_label(ticker: &str) -> Option<&'static str> {
    let label = match ticker {
        "XLY" => "Consumer Discretionary",
        "XLP" => "Consumer Staples",
        "XLE" => "Energy",
        "XLF" => "Financials",
        "XLV" => "Health Care",
        "XLI" => "Industrials",
        "XLK" => "Information Technology",
        "XLB" => "Materials",
        "XLU" => "Utilities",
        _ => return None,
    };
    Some(label)
}

/// Which ticker list the dashboard offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Individual equities.
    Stocks,
    /// S&P 500 sector ETFs.
    #[value(name = "sectors")]
    #[serde(rename = "sectors")]
    SectorEtfs,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Stocks, Category::SectorEtfs];

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Stocks => "Stocks",
            Category::SectorEtfs => "S&P 500",
        }
    }

    pub fn tickers(self) -> &'static [&'static str] {
        match self {
            Category::Stocks => &STOCK_TICKERS,
            Category::SectorEtfs => &SECTOR_ETF_TICKERS,
        }
    }

    pub fn contains(self, ticker: &str) -> bool {
        self.tickers().contains(&ticker)
    }

    /// The category a ticker belongs to, if it is part of the fixed universe.
    pub fn of(ticker: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.contains(ticker))
    }

    pub fn next(self) -> Self {
        match self {
            Category::Stocks => Category::SectorEtfs,
            Category::SectorEtfs => Category::Stocks,
        }
    }

    pub fn prev(self) -> Self {
        // Two variants: stepping either way flips.
        self.next()
    }
}

/// One raw daily observation for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
    pub volume: u64,
}

impl PriceObservation {
    pub fn new(date: NaiveDate, ticker: impl Into<String>, close: f64, volume: u64) -> Self {
        Self {
            date,
            ticker: ticker.into(),
            close,
            volume,
        }
    }
}

/// A price observation augmented with its derived return columns.
///
/// `None` is the missing-value marker: the value is not computable for this
/// row (first observation of a ticker, zero prior close, ...). It is never
/// conflated with a zero return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub close: f64,
    pub volume: u64,
    pub daily_return: Option<f64>,
    pub cumulative_return: Option<f64>,
}

impl ReturnRow {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Calculator output handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSet {
    /// Augmented rows, in the same order as the input observations.
    pub rows: Vec<ReturnRow>,
    /// Distinct tickers, in order of first appearance.
    pub tickers: Vec<String>,
    /// `(min_year, max_year)` over all rows; `None` for an empty set.
    pub years: Option<(i32, i32)>,
}

impl ReturnSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_ticker(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }

    /// Full-span year range, if the set has any rows.
    pub fn full_range(&self) -> Option<YearRange> {
        self.years.map(|(lo, hi)| YearRange::new(lo, hi))
    }
}

/// Inclusive calendar-year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Build a range; the bounds are swapped if given out of order.
    pub fn new(start: i32, end: i32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.year())
    }

    /// Clamp both ends into `bounds`, keeping `start <= end`.
    pub fn clamp_to(self, bounds: YearRange) -> Self {
        let start = self.start.clamp(bounds.start, bounds.end);
        let end = self.end.clamp(bounds.start, bounds.end);
        Self::new(start, end)
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}

/// A full run's configuration as understood by the load pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Raw price cache (CSV).
    pub cache_path: PathBuf,
    /// Ignore an existing cache and fetch again.
    pub refresh: bool,
    /// Synthesize prices instead of calling the network.
    pub offline: bool,
    /// Seed for synthetic prices.
    pub seed: u64,
    /// Fetch window start (inclusive).
    pub start: NaiveDate,
    /// Fetch window end (exclusive).
    pub end: NaiveDate,
    /// Restrict the fetch to one category (default: both).
    pub category: Option<Category>,
}

impl RunConfig {
    /// Tickers to fetch, in a stable order: stocks first, then sector ETFs.
    pub fn tickers(&self) -> Vec<&'static str> {
        match self.category {
            Some(category) => category.tickers().to_vec(),
            None => Category::ALL
                .iter()
                .flat_map(|c| c.tickers().iter().copied())
                .collect(),
        }
    }
}
