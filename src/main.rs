//! Alpha scanner - main entry point
//!
//! This binary provides two subcommands:
//! - scan: Optimize and rank every symbol in a universe
//! - inspect: Deep dive into every DI length for one symbol

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "alpha-scanner")]
#[command(about = "Impulse ignition alpha scanner with adaptive DI length optimization", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Which rows of a scan to print
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanFilter {
    /// Every analyzed symbol
    All,
    /// Only configurations passing the alpha guardrails
    Valid,
    /// Only valid configurations with a fresh buy signal
    Signals,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a ticker universe and rank by alpha
    Scan {
        /// Path to configuration file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Days of history to analyze (overrides config file)
        #[arg(short, long)]
        days: Option<u32>,

        /// Universe preset: vn30 or vn100 (overrides config file)
        #[arg(short, long)]
        preset: Option<String>,

        /// Symbols to scan (comma-separated). E.g., "FPT,HPG,SSI"
        #[arg(long)]
        symbols: Option<String>,

        /// Number of top results to show
        #[arg(short, long)]
        top: Option<usize>,

        /// Which results to show
        #[arg(short, long, value_enum, default_value = "all")]
        filter: ScanFilter,

        /// Run sequentially instead of parallel
        #[arg(long)]
        sequential: bool,
    },

    /// Test every DI length for one symbol
    Inspect {
        /// Ticker to inspect. E.g., "SSI"
        symbol: String,

        /// Path to configuration file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Days of history to analyze (overrides config file)
        #[arg(short, long)]
        days: Option<u32>,

        /// Run sequentially instead of parallel
        #[arg(long)]
        sequential: bool,
    },
}

fn setup_logging(verbose: bool, command_name: &str, file_only: bool) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    if file_only {
        // Scan: keep the console clean for the progress bar
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .init();
    } else {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(true)
            .with_writer(std::io::stderr);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();
    }

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let (command_name, file_only) = match &cli.command {
        Commands::Scan { .. } => ("scan", true),
        Commands::Inspect { .. } => ("inspect", false),
    };

    setup_logging(cli.verbose, command_name, file_only)?;

    match cli.command {
        Commands::Scan {
            config,
            days,
            preset,
            symbols,
            top,
            filter,
            sequential,
        } => commands::scan::run(commands::scan::ScanArgs {
            config,
            days,
            preset,
            symbols,
            top,
            filter,
            sequential,
        }),

        Commands::Inspect {
            symbol,
            config,
            days,
            sequential,
        } => commands::inspect::run(symbol, config, days, sequential),
    }
}
