//! CSV writers: the raw price cache and the augmented returns table.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.
//! Missing derived values are written as empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{PriceObservation, ReturnSet};
use crate::error::AppError;

/// Write the raw price cache, sorted by date (stable, so ticker order survives).
pub fn write_price_cache(path: &Path, observations: &[PriceObservation]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create price cache '{}': {e}", path.display())))?;
    write_prices(file, observations)?;
    log::info!("wrote {} rows to {}", observations.len(), path.display());
    Ok(())
}

pub fn write_prices<W: Write>(sink: W, observations: &[PriceObservation]) -> Result<(), AppError> {
    let mut sorted: Vec<&PriceObservation> = observations.iter().collect();
    sorted.sort_by_key(|o| o.date);

    let mut writer = csv::Writer::from_writer(sink);
    writer
        .write_record(["Date", "Ticker", "Close", "Volume"])
        .map_err(|e| AppError::runtime(format!("Failed to write price cache header: {e}")))?;

    for o in sorted {
        writer
            .write_record([
                o.date.to_string(),
                o.ticker.clone(),
                o.close.to_string(),
                o.volume.to_string(),
            ])
            .map_err(|e| AppError::runtime(format!("Failed to write price cache row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush price cache: {e}")))
}

/// Write the augmented returns table to `path`.
pub fn write_returns_csv(path: &Path, set: &ReturnSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_returns(file, set)
}

pub fn write_returns<W: Write>(sink: W, set: &ReturnSet) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    writer
        .write_record(["Date", "Ticker", "Close", "Volume", "DailyReturn", "CumulativeReturn"])
        .map_err(|e| AppError::runtime(format!("Failed to write export CSV header: {e}")))?;

    for r in &set.rows {
        writer
            .write_record([
                r.date.to_string(),
                r.ticker.clone(),
                r.close.to_string(),
                r.volume.to_string(),
                fmt_opt(r.daily_return),
                fmt_opt(r.cumulative_return),
            ])
            .map_err(|e| AppError::runtime(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush export CSV: {e}")))
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.10}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::io::ingest::read_prices;
    use crate::returns::compute_returns;

    fn obs(d: u32, ticker: &str, close: f64) -> PriceObservation {
        PriceObservation::new(NaiveDate::from_ymd_opt(2012, 5, d).unwrap(), ticker, close, 10)
    }

    #[test]
    fn price_cache_is_sorted_by_date_and_reads_back() {
        let input = vec![obs(2, "A", 11.0), obs(1, "A", 10.0), obs(1, "B", 20.25)];
        let mut buf = Vec::new();
        write_prices(&mut buf, &input).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Ticker,Close,Volume");
        assert_eq!(lines[1], "2012-05-01,A,10,10");
        assert_eq!(lines[2], "2012-05-01,B,20.25,10");
        assert_eq!(lines[3], "2012-05-02,A,11,10");

        let back = read_prices(buf.as_slice()).unwrap();
        assert!(back.row_errors.is_empty());
        assert_eq!(back.observations.len(), 3);
        assert_eq!(compute_returns(&back.observations).rows.len(), 3);
    }

    #[test]
    fn returns_export_leaves_missing_cells_empty() {
        let set = compute_returns(&[obs(1, "X", 100.0), obs(2, "X", 110.0)]);
        let mut buf = Vec::new();
        write_returns(&mut buf, &set).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Date,Ticker,Close,Volume,DailyReturn,CumulativeReturn");
        assert_eq!(lines[1], "2012-05-01,X,100,10,,");
        assert_eq!(lines[2], "2012-05-02,X,110,10,0.1000000000,1.1000000000");
    }
}
