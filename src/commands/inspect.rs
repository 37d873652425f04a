//! Inspect command implementation

use anyhow::{Context, Result};
use alpha_scanner::data::CsvHistoryProvider;
use alpha_scanner::report::{self, Palette};
use alpha_scanner::universe::StaticUniverse;
use alpha_scanner::{AlphaScanner, Symbol};
use std::path::PathBuf;
use tracing::info;

pub fn run(symbol: String, config_path: Option<PathBuf>, days: Option<u32>, sequential: bool) -> Result<()> {
    let symbol = Symbol::new(symbol);
    info!("Starting deep dive for {}", symbol);

    let config = super::load_config(config_path, days, sequential)?;
    let optimizer = super::build_optimizer(&config)?;
    let palette = Palette::detect();

    println!("\n  DEEP DIVE MODE");
    println!(
        "  Analyzing: {} (DI Lengths {}, {} days)\n",
        symbol,
        optimizer.range(),
        config.data.lookback_days
    );

    let provider = CsvHistoryProvider::new(&config.data.data_dir);
    let universe = StaticUniverse::from_symbols([symbol.as_str()]);
    let scanner = AlphaScanner::new(provider, universe, optimizer)
        .with_lookback_days(config.data.lookback_days);

    let inspection = scanner
        .inspect(&symbol)
        .with_context(|| format!("Failed to analyze {}. Check ticker symbol and data directory.", symbol))?;

    print!("{}", report::render_heatmap(&inspection, palette));

    if let Some(best) = inspection.profile.best() {
        info!(
            "{}: best DI {} alpha {:+.2}% ({} of {} lengths valid)",
            symbol,
            best.parameter,
            best.alpha_pct,
            inspection.profile.valid_count(),
            inspection.profile.len()
        );
    }

    Ok(())
}
