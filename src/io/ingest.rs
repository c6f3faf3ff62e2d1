//! CSV cache ingest and validation.
//!
//! This module turns the raw price cache (`Date,Ticker,Close,Volume`) back into
//! `PriceObservation`s that are safe to hand to the return calculator.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip malformed rows, but report what happened)
//! - **No ordering assumptions**: the calculator re-establishes chronology

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::domain::PriceObservation;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub ticker: Option<String>,
    pub message: String,
}

/// Ingest output: valid observations + what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedPrices {
    pub observations: Vec<PriceObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load the price cache at `path`.
pub fn load_price_cache(path: &Path) -> Result<IngestedPrices, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open price cache '{}': {e}", path.display())))?;
    let ingested = read_prices(file)?;

    if !ingested.row_errors.is_empty() {
        log::warn!(
            "{}: skipped {} of {} rows",
            path.display(),
            ingested.row_errors.len(),
            ingested.rows_read
        );
        for err in &ingested.row_errors {
            log::debug!("line {}: {}", err.line, err.message);
        }
    }
    Ok(ingested)
}

/// Parse price rows from any CSV source.
pub fn read_prices<R: Read>(source: R) -> Result<IngestedPrices, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::usage(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    ticker: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(obs) => observations.push(obs),
            Err(message) => row_errors.push(RowError {
                line,
                ticker: get_optional(&record, &header_map, "ticker").map(str::to_string),
                message,
            }),
        }
    }

    Ok(IngestedPrices {
        observations,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for col in ["date", "ticker", "close"] {
        if !header_map.contains_key(col) {
            return Err(AppError::usage(format!("Missing required column: `{col}`")));
        }
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<PriceObservation, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;
    let ticker = get_required(record, header_map, "ticker")?.to_string();

    let close_raw = get_required(record, header_map, "close")?;
    let close = close_raw
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid `close` value '{close_raw}'."))?;

    let volume = match get_optional(record, header_map, "volume") {
        None => 0,
        Some(raw) => parse_volume(raw)?,
    };

    Ok(PriceObservation {
        date,
        ticker,
        close,
        volume,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are what we write; the others show up when the cache has been
    // round-tripped through a spreadsheet or a dataframe library.
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, YYYY-MM-DD HH:MM:SS."
    ))
}

fn parse_volume(s: &str) -> Result<u64, String> {
    if let Ok(v) = s.parse::<u64>() {
        return Ok(v);
    }
    // Dataframe writers often emit integral volumes as floats ("1234.0").
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
        _ => Err(format!("Invalid `volume` value '{s}'.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_well_formed_rows() {
        let csv = "Date,Ticker,Close,Volume\n\
                   2010-01-04,MSFT,30.95,38409100\n\
                   2010-01-04,XLK,23.3,1.5e6\n";
        let ingested = read_prices(csv.as_bytes()).unwrap();
        assert_eq!(ingested.rows_read, 2);
        assert!(ingested.row_errors.is_empty());
        assert_eq!(
            ingested.observations[0],
            PriceObservation::new(NaiveDate::from_ymd_opt(2010, 1, 4).unwrap(), "MSFT", 30.95, 38_409_100)
        );
        assert_eq!(ingested.observations[1].volume, 1_500_000);
    }

    #[test]
    fn malformed_rows_are_skipped_with_line_numbers() {
        let csv = "Date,Ticker,Close,Volume\n\
                   2010-01-04,MSFT,30.95,100\n\
                   ,MSFT,31.0,100\n\
                   2010-01-06,,31.0,100\n\
                   2010-01-07,MSFT,,100\n\
                   2010-01-08,MSFT,abc,100\n\
                   2010-01-11,MSFT,30.0,-5\n\
                   2010-01-12,MSFT,29.0,\n";
        let ingested = read_prices(csv.as_bytes()).unwrap();

        assert_eq!(ingested.rows_read, 7);
        assert_eq!(ingested.observations.len(), 2);
        assert_eq!(ingested.observations[1].volume, 0);

        let lines: Vec<usize> = ingested.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 7]);
        assert_eq!(ingested.row_errors[0].ticker.as_deref(), Some("MSFT"));
        assert_eq!(ingested.row_errors[1].ticker, None);
    }

    #[test]
    fn missing_required_column_is_a_hard_error() {
        let csv = "Date,Symbol,Close\n2010-01-04,MSFT,30.95\n";
        let err = read_prices(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("ticker"));
    }

    #[test]
    fn headers_are_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}DATE,ticker,CLOSE\n2010-01-04 00:00:00,KO,28.55\n";
        let ingested = read_prices(csv.as_bytes()).unwrap();
        assert_eq!(ingested.observations.len(), 1);
        assert_eq!(ingested.observations[0].volume, 0);
        assert_eq!(ingested.observations[0].date, NaiveDate::from_ymd_opt(2010, 1, 4).unwrap());
    }
}
