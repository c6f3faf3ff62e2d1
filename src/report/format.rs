//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the calculator stays clean and testable
//! - output changes are localized

use crate::app::pipeline::LoadOutput;
use crate::domain::{Category, YearRange};
use crate::returns::TickerSummary;

use super::Leaders;

/// Format the load header (where the data came from + dataset shape).
pub fn format_load_summary(load: &LoadOutput) -> String {
    let mut out = String::new();

    out.push_str("=== sr - daily & cumulative returns ===\n");
    out.push_str(&format!("Source: {}\n", load.source.describe()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        load.ingest.rows_read,
        load.ingest.observations.len(),
        load.ingest.row_errors.len()
    ));
    out.push_str(&format!("Tickers: {}\n", load.set.tickers.len()));
    match load.set.full_range() {
        Some(range) => out.push_str(&format!("Years: {range}\n")),
        None => out.push_str("Years: -\n"),
    }
    out
}

/// Format the per-ticker summary table.
pub fn format_summary_table(summaries: &[TickerSummary], range: Option<YearRange>) -> String {
    let mut out = String::new();
    if let Some(range) = range {
        out.push_str(&format!("Window: {range}\n"));
    }

    out.push_str(
        format!(
            "{:<6} {:<8} {:>6} {:<10} {:<10} {:>10} {:>10} {:>10} {:>10} {:>5}\n",
            "ticker", "category", "n", "first", "last", "close", "total", "mean/day", "vol/day", "miss"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<6} {:-<8} {:-<6} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10} {:-<5}\n",
            "", "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in summaries {
        out.push_str(
            format!(
                "{:<6} {:<8} {:>6} {:<10} {:<10} {:>10.2} {:>10} {:>10} {:>10} {:>5}\n",
                truncate(&s.ticker, 6),
                truncate(category_label(&s.ticker), 8),
                s.observations,
                s.first_date,
                s.last_date,
                s.last_close,
                fmt_pct(s.total_return, 1),
                fmt_pct(s.mean_daily_return, 3),
                fmt_pct(s.daily_volatility, 3),
                s.missing_values,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the best/worst performers by total return.
pub fn format_leaders(leaders: &Leaders) -> String {
    let mut out = String::new();
    out.push_str("Top performers (total return):\n");
    for s in &leaders.best {
        out.push_str(&format!("  {:<6} {:>10}\n", s.ticker, fmt_pct(s.total_return, 1)));
    }
    out.push_str("Bottom performers (total return):\n");
    for s in &leaders.worst {
        out.push_str(&format!("  {:<6} {:>10}\n", s.ticker, fmt_pct(s.total_return, 1)));
    }
    out
}

fn category_label(ticker: &str) -> &'static str {
    Category::of(ticker).map(Category::display_name).unwrap_or("-")
}

/// Percent with `digits` decimals; missing prints as `-`.
pub fn fmt_pct(v: Option<f64>, digits: usize) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{:.*}%", digits, v * 100.0),
        _ => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
