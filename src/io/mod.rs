//! Input/output helpers.
//!
//! - price cache ingest + validation (`ingest`)
//! - price cache and returns CSV writers (`export`)
//! - summary JSON (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
