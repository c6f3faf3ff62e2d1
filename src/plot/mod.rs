//! Terminal plots for non-interactive use.

pub mod ascii;

pub use ascii::{render_ascii_plot, PlotSeries};
