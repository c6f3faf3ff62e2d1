//! `sector-returns` library crate.
//!
//! The binary (`sr`) is a thin wrapper around this library so that:
//!
//! - the return calculator is testable without spawning processes
//! - the dashboard and the batch commands share one load pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod returns;
pub mod tui;
pub mod view;
