//! Summary JSON export.
//!
//! The file carries the same information the dashboard uses to populate its
//! selectors (tickers, year span) plus the per-ticker statistics.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{Category, ReturnSet};
use crate::error::AppError;
use crate::returns::TickerSummary;

#[derive(Debug, Serialize)]
pub struct SummaryFile<'a> {
    pub tool: &'static str,
    pub rows: usize,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub tickers: Vec<TickerEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TickerEntry<'a> {
    pub category: Option<Category>,
    #[serde(flatten)]
    pub summary: &'a TickerSummary,
}

pub fn summary_file<'a>(set: &ReturnSet, summaries: &'a [TickerSummary]) -> SummaryFile<'a> {
    SummaryFile {
        tool: "sr",
        rows: set.rows.len(),
        min_year: set.years.map(|(lo, _)| lo),
        max_year: set.years.map(|(_, hi)| hi),
        tickers: summaries
            .iter()
            .map(|summary| TickerEntry {
                category: Category::of(&summary.ticker),
                summary,
            })
            .collect(),
    }
}

/// Write the summary JSON to `path`.
pub fn write_summary_json(path: &Path, set: &ReturnSet, summaries: &[TickerSummary]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    write_summary(file, set, summaries)
}

pub fn write_summary<W: Write>(sink: W, set: &ReturnSet, summaries: &[TickerSummary]) -> Result<(), AppError> {
    serde_json::to_writer_pretty(sink, &summary_file(set, summaries))
        .map_err(|e| AppError::runtime(format!("Failed to write summary JSON: {e}")))
}
