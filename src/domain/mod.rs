//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw price observations (`PriceObservation`)
//! - calculator outputs (`ReturnRow`, `ReturnSet`)
//! - the fixed ticker universe (`Category`, `STOCK_TICKERS`, `SECTOR_ETF_TICKERS`)
//! - run configuration (`RunConfig`, `YearRange`)

pub mod types;

pub use types::*;
