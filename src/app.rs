//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments
//! - loads prices (cache, Yahoo, or synthetic) and computes returns
//! - prints reports/plots
//! - writes optional exports
//! - launches the dashboard

use clap::Parser;

use crate::cli::{Command, ExportArgs, LoadArgs, PlotArgs, SummaryArgs, YearArgs};
use crate::domain::{PriceObservation, ReturnSet, RunConfig, YearRange};
use crate::error::AppError;
use crate::returns::compute_returns;
use crate::view::{ChartView, SeriesToggles};

pub mod pipeline;

/// Entry point for the `sr` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    // `sr` and `sr --offline` behave like `sr dash ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    log::debug!("command: {:?}", cli.command);

    match cli.command {
        Command::Fetch(args) => handle_fetch(&args),
        Command::Summary(args) => handle_summary(&args),
        Command::Export(args) => handle_export(&args),
        Command::Plot(args) => handle_plot(&args),
        Command::Dash(args) => crate::tui::run(config_from_args(&args)),
    }
}

fn init_logging() {
    // `RUST_LOG` overrides; stay quiet by default so the dashboard isn't drawn over.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .try_init();
}

fn handle_fetch(args: &LoadArgs) -> Result<(), AppError> {
    let config = config_from_args(args);
    let source = pipeline::fetch_to_cache(&config)?;
    println!(
        "Wrote {} from {}.",
        config.cache_path.display(),
        source.describe()
    );
    Ok(())
}

fn handle_summary(args: &SummaryArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.load);
    let load = pipeline::load(&config)?;

    // Window statistics are computed on the window's own rows, so a window's
    // total return starts from its first close.
    let range = resolve_range(&load.set, args.years);
    let set = match range {
        Some(range) => recompute_window(&load.ingest.observations, range),
        None => load.set.clone(),
    };
    if set.is_empty() {
        return Err(AppError::no_data("No rows inside the requested year window."));
    }

    let summaries = crate::returns::summarize(&set);
    println!("{}", crate::report::format_load_summary(&load));
    println!("{}", crate::report::format_summary_table(&summaries, range));
    if args.top > 0 {
        let leaders = crate::report::rank_by_total_return(&summaries, args.top);
        println!("{}", crate::report::format_leaders(&leaders));
    }

    if let Some(path) = &args.json {
        crate::io::write_summary_json(path, &set, &summaries)?;
        println!("Wrote {}.", path.display());
    }
    Ok(())
}

fn handle_export(args: &ExportArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.load);
    let load = pipeline::load(&config)?;
    crate::io::write_returns_csv(&args.out, &load.set)?;
    println!("Wrote {} rows to {}.", load.set.rows.len(), args.out.display());
    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.load);
    let load = pipeline::load(&config)?;

    if !load.set.has_ticker(&args.ticker) {
        return Err(AppError::no_data(format!(
            "No rows for ticker {}. Loaded: {}",
            args.ticker,
            load.set.tickers.join(", ")
        )));
    }

    let range = resolve_range(&load.set, args.years);
    let view = ChartView::build(&load.set, &args.ticker, range, SeriesToggles::default());
    let plot = crate::plot::render_ascii_plot(&view, args.series, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn config_from_args(args: &LoadArgs) -> RunConfig {
    RunConfig {
        cache_path: args.cache.clone(),
        refresh: args.refresh,
        offline: args.offline,
        seed: args.seed,
        start: args.start,
        end: args.end,
        category: args.category,
    }
}

/// Turn `--from/--to` into a range, filling open ends from the data span.
fn resolve_range(set: &ReturnSet, years: YearArgs) -> Option<YearRange> {
    if years.from_year.is_none() && years.to_year.is_none() {
        return None;
    }
    let (lo, hi) = set.years?;
    Some(YearRange::new(
        years.from_year.unwrap_or(lo),
        years.to_year.unwrap_or(hi),
    ))
}

fn recompute_window(observations: &[PriceObservation], range: YearRange) -> ReturnSet {
    let window: Vec<PriceObservation> = observations
        .iter()
        .filter(|o| range.contains_date(o.date))
        .cloned()
        .collect();
    compute_returns(&window)
}

/// Rewrite argv so `sr` defaults to `sr dash`.
///
/// Rules:
/// - `sr`                      -> `sr dash`
/// - `sr --offline ...`        -> `sr dash --offline ...`
/// - `sr --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("dash".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "dash flags".
    if arg1.starts_with('-') {
        argv.insert(1, "dash".to_string());
    }

    argv
}
