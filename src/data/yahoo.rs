//! Yahoo Finance chart API integration (daily close + volume).

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use rayon::prelude::*;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::PriceObservation;
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) sector-returns/0.1";
const TIMEOUT_SECS: u64 = 30;

pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    /// Build a client; `YAHOO_CHART_URL` (environment or `.env`) overrides the endpoint.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var("YAHOO_CHART_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch every ticker in parallel; rows come back grouped in `tickers` order.
    pub fn fetch_all(
        &self,
        tickers: &[&str],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>, AppError> {
        let per_ticker: Vec<Result<Vec<PriceObservation>, AppError>> = tickers
            .par_iter()
            .map(|ticker| self.fetch_history(ticker, start, end))
            .collect();

        let mut out = Vec::new();
        for rows in per_ticker {
            out.extend(rows?);
        }
        log::info!("fetched {} observations for {} tickers", out.len(), tickers.len());
        Ok(out)
    }

    /// Daily history for one ticker over `[start, end)`.
    pub fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>, AppError> {
        let url = format!("{}/{}", self.base_url, ticker);
        log::debug!("[{ticker}] GET {url}");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", unix_seconds(start).to_string()),
                ("period2", unix_seconds(end).to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(|e| AppError::runtime(format!("Yahoo request for {ticker} failed: {e}")))?;

        if resp.status() == StatusCode::NOT_FOUND {
            log::warn!("[{ticker}] not found on Yahoo; no rows for this ticker");
            return Ok(Vec::new());
        }
        if !resp.status().is_success() {
            return Err(AppError::runtime(format!(
                "Yahoo request for {ticker} failed with status {}.",
                resp.status()
            )));
        }

        let body: ChartResponse = resp
            .json()
            .map_err(|e| AppError::runtime(format!("Failed to parse Yahoo response for {ticker}: {e}")))?;

        Ok(parse_chart(ticker, body))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Turn a decoded chart payload into observations.
///
/// Entries without a close are malformed and skipped; a missing volume is 0.
fn parse_chart(ticker: &str, body: ChartResponse) -> Vec<PriceObservation> {
    if let Some(err) = &body.chart.error {
        log::warn!("[{ticker}] Yahoo error {}: {}", err.code, err.description);
    }

    let Some(result) = body.chart.result.and_then(|r| r.into_iter().next()) else {
        log::warn!("[{ticker}] failed to extract price data; no rows for this ticker");
        return Vec::new();
    };
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        log::warn!("[{ticker}] response has no quote block; no rows for this ticker");
        return Vec::new();
    };

    let offset = result.meta.gmtoffset;
    let mut out = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;

    for (idx, ts) in result.timestamp.iter().enumerate() {
        let close = quote.close.get(idx).copied().flatten();
        let date = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive());
        let (Some(close), Some(date)) = (close, date) else {
            skipped += 1;
            continue;
        };
        let volume = quote
            .volume
            .get(idx)
            .copied()
            .flatten()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
            .unwrap_or(0);
        out.push(PriceObservation::new(date, ticker, close, volume));
    }

    if skipped > 0 {
        log::warn!("[{ticker}] skipped {skipped} entries without a close");
    }
    out
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_closes_and_volumes_in_exchange_local_dates() {
        // 2021-01-04 14:30 UTC and 2021-01-05 14:30 UTC (09:30 New York).
        let body = decode(
            r#"{"chart":{"result":[{
                "meta":{"gmtoffset":-18000},
                "timestamp":[1609770600,1609857000],
                "indicators":{"quote":[{"close":[129.41,131.01],"volume":[143301900,97664900]}]}
            }],"error":null}}"#,
        );
        let rows = parse_chart("AAPL", body);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2021, 1, 4).unwrap());
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2021, 1, 5).unwrap());
        assert_eq!(rows[0].ticker, "AAPL");
        assert_eq!(rows[1].close, 131.01);
        assert_eq!(rows[0].volume, 143_301_900);
    }

    #[test]
    fn null_close_is_skipped_and_null_volume_is_zero() {
        let body = decode(
            r#"{"chart":{"result":[{
                "meta":{"gmtoffset":0},
                "timestamp":[1609770600,1609857000,1609943400],
                "indicators":{"quote":[{"close":[10.0,null,12.0],"volume":[100,200,null]}]}
            }],"error":null}}"#,
        );
        let rows = parse_chart("BB", body);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].close, 10.0);
        assert_eq!(rows[1].close, 12.0);
        assert_eq!(rows[1].volume, 0);
    }

    #[test]
    fn missing_result_yields_no_rows() {
        let body = decode(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        assert!(parse_chart("APE", body).is_empty());
    }

    #[test]
    fn unix_seconds_is_midnight_utc() {
        let d = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        assert_eq!(unix_seconds(d), 1_262_304_000);
    }
}
