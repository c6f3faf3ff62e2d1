//! Command-line parsing for the returns dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the calculator and the presentation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Category;
use crate::plot::PlotSeries;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sr", version, about = "Daily & cumulative returns for stocks and S&P 500 sector ETFs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download prices (or synthesize them with --offline) and write the price cache.
    Fetch(LoadArgs),
    /// Print per-ticker return statistics.
    Summary(SummaryArgs),
    /// Write every row with its daily and cumulative return to CSV.
    Export(ExportArgs),
    /// Plot one ticker's close or return series in the terminal.
    Plot(PlotArgs),
    /// Launch the interactive dashboard.
    Dash(LoadArgs),
}

/// Where prices come from and how they are cached.
#[derive(Debug, Args, Clone)]
pub struct LoadArgs {
    /// Price cache (CSV). Read when present, written after a fetch.
    #[arg(long, value_name = "CSV", default_value = "prices.csv")]
    pub cache: PathBuf,

    /// Ignore an existing cache and fetch again.
    #[arg(long)]
    pub refresh: bool,

    /// Use seeded synthetic prices instead of the network.
    #[arg(long)]
    pub offline: bool,

    /// Random seed for --offline prices.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date to fetch (YYYY-MM-DD).
    #[arg(long, default_value = "2010-01-01")]
    pub start: NaiveDate,

    /// Fetch up to (not including) this date (YYYY-MM-DD).
    #[arg(long, default_value = "2023-12-31")]
    pub end: NaiveDate,

    /// Only fetch one category (stocks or sectors).
    #[arg(long, value_enum)]
    pub category: Option<Category>,
}

/// Inclusive year window applied after loading.
#[derive(Debug, Args, Clone, Copy)]
pub struct YearArgs {
    /// First calendar year to include.
    #[arg(long = "from", value_name = "YEAR")]
    pub from_year: Option<i32>,

    /// Last calendar year to include.
    #[arg(long = "to", value_name = "YEAR")]
    pub to_year: Option<i32>,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    #[command(flatten)]
    pub years: YearArgs,

    /// Show top-N best and worst performers.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Also write the summary as JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    #[command(flatten)]
    pub years: YearArgs,

    /// Ticker to plot.
    #[arg(short, long)]
    pub ticker: String,

    /// Series to plot.
    #[arg(long, value_enum, default_value_t = PlotSeries::Cumulative)]
    pub series: PlotSeries,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
