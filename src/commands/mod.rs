//! Subcommand implementations

pub mod inspect;
pub mod scan;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use alpha_scanner::{Config, Optimizer};

/// Load the config file (or defaults) and apply the shared CLI overrides
fn load_config(config_path: Option<PathBuf>, days: Option<u32>, sequential: bool) -> Result<Config> {
    let mut config = Config::load(config_path.as_deref())?;
    match &config_path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("Using default configuration"),
    }

    if let Some(days) = days {
        info!("Overriding lookback to: {} days", days);
        config.data.lookback_days = days;
    }
    if sequential {
        config.optimizer.parallel = false;
    }

    config.validate()?;
    Ok(config)
}

fn build_optimizer(config: &Config) -> Result<Optimizer> {
    Optimizer::new(&config.optimizer, config.signal).context("Invalid optimizer configuration")
}
