//! Scan command implementation with progress tracking

use anyhow::{bail, Result};
use alpha_scanner::data::CsvHistoryProvider;
use alpha_scanner::report::{self, Palette};
use alpha_scanner::universe::{StaticUniverse, TickerUniverse};
use alpha_scanner::{AlphaScanner, AnalysisResult};
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use std::path::PathBuf;
use tracing::info;

use crate::ScanFilter;

/// Parsed `scan` arguments
#[derive(Debug)]
pub struct ScanArgs {
    pub config: Option<PathBuf>,
    pub days: Option<u32>,
    pub preset: Option<String>,
    pub symbols: Option<String>,
    pub top: Option<usize>,
    pub filter: ScanFilter,
    pub sequential: bool,
}

/// Parse comma-separated tickers
fn parse_symbol_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|sym| sym.trim().to_uppercase())
        .filter(|sym| !sym.is_empty())
        .collect()
}

pub fn run(args: ScanArgs) -> Result<()> {
    info!("Starting scan");

    let mut config = super::load_config(args.config, args.days, args.sequential)?;

    if let Some(preset) = args.preset {
        info!("Overriding universe preset to: {}", preset);
        config.universe.preset = preset;
        config.universe.symbols.clear();
    }
    if let Some(symbols) = args.symbols.as_deref() {
        config.universe.symbols = parse_symbol_list(symbols);
        info!("Using {} symbols from --symbols", config.universe.symbols.len());
    }

    let universe = StaticUniverse::from_config(&config.universe)?;
    if universe.is_empty() {
        bail!("Universe is empty. Pass --symbols or choose a preset.");
    }
    let universe_label = if config.universe.symbols.is_empty() {
        config.universe.preset.to_uppercase()
    } else {
        "CUSTOM".to_string()
    };
    let symbol_count = universe.list_symbols().len();

    let optimizer = super::build_optimizer(&config)?;
    let palette = Palette::detect();

    print!(
        "{}",
        report::render_header(
            &universe_label,
            symbol_count,
            config.data.lookback_days,
            optimizer.range(),
            palette
        )
    );
    println!(
        "  Mode: {} | Data dir: {}\n",
        if config.optimizer.parallel { "parallel" } else { "sequential" },
        config.data.data_dir.display()
    );

    let provider = CsvHistoryProvider::new(&config.data.data_dir);
    let scanner = AlphaScanner::new(provider, universe, optimizer)
        .with_lookback_days(config.data.lookback_days)
        .with_parallelism(config.optimizer.parallel);

    // Single progress bar (tqdm style), one tick per symbol
    let pb = ProgressBar::new(symbol_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("⚡ {percent:>3}%|{bar:40}| {pos}/{len} [{elapsed}<{eta}, {per_sec:.2}] ✓ {msg}")?
            .progress_chars("█░ "),
    );

    let scan_report = scanner.scan_with_progress(&pb);
    pb.finish_with_message(format!("{} analyzed", scan_report.results.len()));
    println!();

    let shown: Vec<AnalysisResult> = match args.filter {
        ScanFilter::All => scan_report.results.clone(),
        ScanFilter::Valid => scan_report.opportunities().cloned().collect(),
        ScanFilter::Signals => scan_report.signals().cloned().collect(),
    };
    let display_count = args.top.unwrap_or(shown.len()).min(shown.len());
    info!(
        "Displaying {} of {} results (filter: {:?})",
        display_count,
        shown.len(),
        args.filter
    );

    print!("{}", report::render_results_table(&shown[..display_count], palette));
    print!("{}", report::render_footer(&scan_report, palette));

    if !scan_report.failures.is_empty() {
        info!(
            "Skipped symbols: {}",
            scan_report
                .failures
                .iter()
                .map(|f| format!("{} ({})", f.symbol, f.error))
                .join(", ")
        );
    }

    info!("Scan completed successfully");

    Ok(())
}
