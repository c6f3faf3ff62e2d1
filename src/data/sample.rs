//! Synthetic daily price paths for offline runs.
//!
//! Each ticker gets a seeded jump-diffusion (geometric Brownian motion with
//! rare multiplicative jumps) sampled on weekdays inside the configured window.
//! Output is deterministic for a given `(seed, ticker, window)`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::{PriceObservation, RunConfig};
use crate::error::AppError;

/// Probability of a jump day.
const JUMP_PROB: f64 = 0.01;
/// Jump size in units of daily sigma.
const JUMP_K: f64 = 4.0;

/// Per-ticker path parameters derived from the ticker's own seed.
#[derive(Debug, Clone, Copy)]
struct PathParams {
    start_price: f64,
    /// Annualized drift.
    mu: f64,
    /// Annualized volatility.
    sigma: f64,
    /// Median daily volume.
    volume_median: f64,
}

/// Generate observations for every ticker of `config`, grouped by ticker.
pub fn generate_prices(config: &RunConfig) -> Result<Vec<PriceObservation>, AppError> {
    if config.end <= config.start {
        return Err(AppError::usage(format!(
            "Invalid window: end {} must be after start {}.",
            config.end, config.start
        )));
    }

    let mut out = Vec::new();
    for ticker in config.tickers() {
        out.extend(generate_ticker(ticker, config)?);
    }
    log::info!("generated {} synthetic observations", out.len());
    Ok(out)
}

/// Generate one ticker's path.
pub fn generate_ticker(ticker: &str, config: &RunConfig) -> Result<Vec<PriceObservation>, AppError> {
    let mut rng = StdRng::seed_from_u64(ticker_seed(ticker, config));
    let params = path_params(&mut rng);

    let dt: f64 = 1.0 / 252.0;
    let daily_sigma = params.sigma * dt.sqrt();
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;
    let volume_dist = LogNormal::new(params.volume_median.ln(), 0.35)
        .map_err(|e| AppError::runtime(format!("Volume distribution error: {e}")))?;

    let mut out = Vec::new();
    let mut price = params.start_price;
    let mut first = true;

    for date in weekdays(config.start, config.end) {
        if !first {
            let z = normal.sample(&mut rng);
            let jump = sample_jump(&mut rng);
            let drift = (params.mu - 0.5 * params.sigma * params.sigma) * dt;
            price *= (drift + daily_sigma * (z + jump)).exp();
        }
        first = false;

        let volume: f64 = volume_dist.sample(&mut rng);
        out.push(PriceObservation::new(
            date,
            ticker,
            round_cents(price),
            volume.round().max(0.0) as u64,
        ));
    }

    Ok(out)
}

fn path_params(rng: &mut StdRng) -> PathParams {
    PathParams {
        start_price: rng.gen_range(15.0..=350.0),
        mu: rng.gen_range(-0.05..=0.25),
        sigma: rng.gen_range(0.15..=0.65),
        volume_median: rng.gen_range(2.0e5..=4.0e7),
    }
}

fn sample_jump(rng: &mut StdRng) -> f64 {
    let roll: f64 = rng.r#gen();
    if roll < JUMP_PROB / 2.0 {
        JUMP_K
    } else if roll < JUMP_PROB {
        -JUMP_K
    } else {
        0.0
    }
}

fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Monday-to-Friday dates in `[start, end)`.
fn weekdays(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_signed(Duration::days(1)))
        .take_while(move |d| *d < end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
}

fn ticker_seed(ticker: &str, config: &RunConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    ticker.hash(&mut hasher);
    config.start.hash(&mut hasher);
    hasher.finish()
}
