//! Ticker universes
//!
//! A universe is an insertion-ordered, de-duplicated set of symbols. Scan
//! output keeps this order until ranking.

use anyhow::{bail, Result};
use indexmap::IndexSet;

use crate::config::UniverseConfig;
use crate::Symbol;

/// VN30 constituents
pub const VN30: &[&str] = &[
    "ACB", "BCM", "BID", "BVH", "CTG", "FPT", "GAS", "GVR", "HDB", "HPG",
    "MBB", "MSN", "MWG", "PLX", "POW", "SAB", "SHB", "SSB", "SSI", "STB",
    "TCB", "TPB", "VCB", "VHM", "VIB", "VIC", "VJC", "VNM", "VPB", "VRE",
];

/// Liquid mid-caps appended to VN30 to form the VN100 preset
const MIDCAP_LIQUID: &[&str] = &[
    // real estate
    "DIG", "DXG", "KDH", "NLG", "PDR", "KBC", "DXS", "NVL", "CEO", "HDG",
    "IJC", "SCR", "TDH", "HAR", "VRC", "NHA", "LDG", "NBB", "TIP", "IDC",
    // securities
    "VND", "HCM", "VCI", "VIX", "FTS", "BSI", "CTS", "AGR", "SHS", "TVS",
    "APG", "TCI", "ART", "EVF", "ORS", "DSC", "BVS", "PSI", "MBS",
    // industrials
    "GEX", "PC1", "REE", "CTD", "FCN", "HBC", "HHV", "LCG", "VCG", "CII",
    "HT1", "DGC", "DCM", "DPM", "LAS", "CSV", "PVD", "PVT", "GIL", "NT2",
    // consumer
    "FRT", "PNJ", "DGW", "MWG", "VGC", "PAN", "HAG", "HNG", "ASM", "AMV",
    // technology
    "CMG", "ELC", "ITD", "SAM", "VGI", "ONE", "VTP",
    // food and agriculture
    "VHC", "ANV", "IDI", "ABT", "HSL", "LSS", "HAP", "BBC",
    // logistics
    "GMD", "VOS", "DVP", "PHP", "TMS", "HAH", "VSC",
];

/// Source of the symbols to scan
pub trait TickerUniverse: Send + Sync {
    fn list_symbols(&self) -> IndexSet<Symbol>;
}

/// Fixed list of tickers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticUniverse {
    symbols: IndexSet<Symbol>,
}

impl StaticUniverse {
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticUniverse {
            symbols: symbols
                .into_iter()
                .map(Symbol::new)
                .filter(|s| !s.as_str().is_empty())
                .collect(),
        }
    }

    pub fn vn30() -> Self {
        Self::from_symbols(VN30.iter().copied())
    }

    /// VN30 followed by liquid mid-caps; duplicates keep their first position
    pub fn vn100() -> Self {
        Self::from_symbols(VN30.iter().chain(MIDCAP_LIQUID).copied())
    }

    pub fn from_preset(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "vn30" => Ok(Self::vn30()),
            "vn100" => Ok(Self::vn100()),
            other => bail!("Unknown universe preset '{}' (expected vn30 or vn100)", other),
        }
    }

    /// Explicit symbols take precedence over the preset
    pub fn from_config(config: &UniverseConfig) -> Result<Self> {
        if config.symbols.is_empty() {
            Self::from_preset(&config.preset)
        } else {
            Ok(Self::from_symbols(config.symbols.iter().map(String::as_str)))
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl TickerUniverse for StaticUniverse {
    fn list_symbols(&self) -> IndexSet<Symbol> {
        self.symbols.clone()
    }
}
