//! Shared "load pipeline" used by every command and by the dashboard.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! cache or fetch -> write cache -> ingest cache -> compute returns
//!
//! The cache round-trip is the single ingest path: freshly fetched data goes
//! through the same validation as a cache written last week.

use std::path::PathBuf;

use crate::data::{generate_prices, YahooClient};
use crate::domain::{PriceObservation, ReturnSet, RunConfig};
use crate::error::AppError;
use crate::io::{load_price_cache, write_price_cache, IngestedPrices};
use crate::returns::compute_returns;

/// Where the loaded rows came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Cache(PathBuf),
    Yahoo,
    Synthetic { seed: u64 },
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::Cache(path) => format!("cache {}", path.display()),
            DataSource::Yahoo => "Yahoo Finance".to_string(),
            DataSource::Synthetic { seed } => format!("synthetic (seed {seed})"),
        }
    }
}

/// All computed outputs of a single load.
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub source: DataSource,
    pub ingest: IngestedPrices,
    pub set: ReturnSet,
}

/// Read the cache (fetching first when needed) and compute returns.
pub fn load(config: &RunConfig) -> Result<LoadOutput, AppError> {
    let source = if config.cache_path.exists() && !config.refresh {
        log::info!("using cached prices from {}", config.cache_path.display());
        DataSource::Cache(config.cache_path.clone())
    } else {
        fetch_to_cache(config)?
    };

    let ingest = load_price_cache(&config.cache_path)?;
    if ingest.observations.is_empty() {
        return Err(AppError::no_data(format!(
            "No valid rows in {} ({} read, {} skipped).",
            config.cache_path.display(),
            ingest.rows_read,
            ingest.row_errors.len()
        )));
    }

    let set = compute_returns(&ingest.observations);
    if let DataSource::Cache(path) = &source {
        let missing = missing_tickers(config, &set);
        if !missing.is_empty() {
            log::warn!(
                "{} has no rows for {} requested ticker(s): {} (use --refresh to fetch them)",
                path.display(),
                missing.len(),
                missing.join(", ")
            );
        }
    }
    log::info!(
        "computed returns for {} rows across {} tickers",
        set.rows.len(),
        set.tickers.len()
    );

    Ok(LoadOutput { source, ingest, set })
}

/// Requested tickers that the loaded set has no rows for.
pub fn missing_tickers(config: &RunConfig, set: &ReturnSet) -> Vec<&'static str> {
    config
        .tickers()
        .into_iter()
        .filter(|t| !set.has_ticker(t))
        .collect()
}

/// Fetch (or synthesize) prices and overwrite the cache.
pub fn fetch_to_cache(config: &RunConfig) -> Result<DataSource, AppError> {
    let (observations, source) = fetch(config)?;
    if observations.is_empty() {
        return Err(AppError::no_data("The price source returned no rows."));
    }
    write_price_cache(&config.cache_path, &observations)?;
    Ok(source)
}

fn fetch(config: &RunConfig) -> Result<(Vec<PriceObservation>, DataSource), AppError> {
    if config.offline {
        return Ok((generate_prices(config)?, DataSource::Synthetic { seed: config.seed }));
    }
    let client = YahooClient::from_env()?;
    let rows = client.fetch_all(&config.tickers(), config.start, config.end)?;
    Ok((rows, DataSource::Yahoo))
}
