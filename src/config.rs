//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable support for the price-history location.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::optimizer::ParameterRange;
use crate::Symbol;

/// Environment variable overriding `data.data_dir`
pub const DATA_DIR_ENV: &str = "ALPHA_SCANNER_DATA_DIR";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub universe: UniverseConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;

        config.apply_env_overrides(std::env::var(DATA_DIR_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise start from defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let mut config = Config::default();
                config.apply_env_overrides(std::env::var(DATA_DIR_ENV).ok());
                Ok(config)
            }
        }
    }

    pub fn apply_env_overrides(&mut self, data_dir: Option<String>) {
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data.data_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.optimizer
            .range()
            .validate()
            .context("Invalid optimizer length range")?;

        if self.data.lookback_days == 0 {
            bail!("data.lookback_days must be positive");
        }
        if self.signal.moderate_threshold > self.signal.strong_threshold {
            bail!(
                "signal.moderate_threshold ({}) exceeds signal.strong_threshold ({})",
                self.signal.moderate_threshold,
                self.signal.strong_threshold
            );
        }
        Ok(())
    }
}

/// Price history location and window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    /// Calendar days of history kept, counted back from the latest bar
    pub lookback_days: u32,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: PathBuf::from("data"),
            lookback_days: 730,
        }
    }
}

/// DI length sweep settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub min_length: usize,
    pub max_length: usize,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            min_length: 1,
            max_length: 40,
            parallel: true,
        }
    }
}

impl OptimizerConfig {
    pub fn range(&self) -> ParameterRange {
        ParameterRange {
            start: self.min_length,
            end: self.max_length,
        }
    }
}

/// Trend strength thresholds on |+DI - -DI|
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    pub strong_threshold: f64,
    pub moderate_threshold: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            strong_threshold: 20.0,
            moderate_threshold: 10.0,
        }
    }
}

/// Which tickers to scan. An explicit `symbols` list wins over `preset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    pub preset: String,
    #[serde(default)]
    pub symbols: Vec<String>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        UniverseConfig {
            preset: "vn100".to_string(),
            symbols: Vec::new(),
        }
    }
}

impl UniverseConfig {
    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols.iter().map(Symbol::new).collect()
    }
}
