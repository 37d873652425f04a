//! Terminal rendering
//!
//! Every renderer returns a `String` so the commands decide where it goes.
//! Color support is decided once by [`Palette::detect`] and passed in.

use std::io::IsTerminal;

use crate::optimizer::ParameterRange;
use crate::scanner::{Inspection, ScanReport};
use crate::{AnalysisResult, ParameterResult};

const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const HEATMAP_BAR_WIDTH: usize = 35;

/// ANSI styling capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    /// Colors on when stdout is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        Palette {
            enabled: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn plain() -> Self {
        Palette { enabled: false }
    }

    pub fn colored() -> Self {
        Palette { enabled: true }
    }

    fn paint(&self, codes: &[&str], text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", codes.concat(), text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Prices of 1000 and above are shown in thousands
pub fn format_price(price: f64) -> String {
    if price >= 1000.0 {
        format!("{:.1}K", price / 1000.0)
    } else {
        format!("{:.2}", price)
    }
}

fn format_alpha(alpha_pct: f64) -> String {
    format!("{:+.1}%", alpha_pct)
}

// =============================================================================
// Scan
// =============================================================================

pub fn render_header(universe: &str, symbol_count: usize, lookback_days: u32, range: ParameterRange, palette: Palette) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", palette.paint(&[CYAN, BOLD], &rule)));
    out.push_str(&format!(
        "{}\n",
        palette.paint(&[CYAN, BOLD], "       IMPULSE IGNITION ALPHA SCANNER")
    ));
    out.push_str(&format!("{}\n\n", palette.paint(&[CYAN, BOLD], &rule)));
    out.push_str(&format!(
        "  Universe: {} ({} symbols) | Data: {} days\n",
        palette.paint(&[YELLOW], universe),
        symbol_count,
        lookback_days
    ));
    out.push_str(&format!(
        "  Strategy: {} | DI Range: {}\n",
        palette.paint(&[YELLOW], "Impulse Ignition"),
        palette.paint(&[YELLOW], &format!("{} Optimization", range))
    ));
    out.push_str(&format!("  Alpha Guardrails: {}\n\n", palette.paint(&[GREEN], "Active")));
    out.push_str(&format!("{}\n", palette.paint(&[CYAN], &"-".repeat(80))));
    out
}

fn action_label(result: &AnalysisResult) -> &'static str {
    if result.is_actionable() {
        "BUY"
    } else if result.is_valid() {
        "WATCH"
    } else {
        "AVOID"
    }
}

pub fn render_results_table(results: &[AnalysisResult], palette: Palette) -> String {
    if results.is_empty() {
        return format!("{}\n", palette.paint(&[YELLOW], "  No results to display."));
    }

    let mut out = String::new();
    let header = format!(
        "{:<8} {:>10} {:<8} {:<6} {:>6} {:>10} {:>6} {:<10}",
        "Ticker", "Price", "Trend", "Str", "OptLen", "Alpha", "Valid", "Signal"
    );
    out.push_str(&format!("{}\n", palette.paint(&[BOLD], &header)));
    out.push_str(&format!("{}\n", "-".repeat(80)));

    for r in results {
        let row = format!(
            "{:<8} {:>10} {:<8} {:<6} {:>6} {:>10} {:>6} {:<10}",
            r.symbol.as_str(),
            format_price(r.close_price),
            r.trend().to_string(),
            r.trend_strength.short_label(),
            r.optimal_length(),
            format_alpha(r.alpha_pct()),
            if r.is_valid() { "YES" } else { "NO" },
            action_label(r)
        );

        let style: &[&str] = if r.is_actionable() {
            &[GREEN, BOLD]
        } else if r.is_valid() {
            &[CYAN]
        } else {
            &[DIM]
        };
        out.push_str(&format!("{}\n", palette.paint(style, row.trim_end())));
    }

    out.push_str(&format!("{}\n", "-".repeat(80)));
    out
}

pub fn render_footer(report: &ScanReport, palette: Palette) -> String {
    let rule = palette.paint(&[CYAN], &"=".repeat(80));
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", rule));
    out.push_str("  SCAN COMPLETE\n");
    out.push_str(&format!(
        "  Total: {} stocks | Opportunities: {} | Buy Signals: {}\n",
        palette.paint(&[YELLOW], &report.results.len().to_string()),
        palette.paint(&[GREEN], &report.opportunity_count().to_string()),
        palette.paint(&[GREEN, BOLD], &report.signal_count().to_string())
    ));
    if !report.failures.is_empty() {
        out.push_str(&format!(
            "  Skipped: {} (see log for details)\n",
            palette.paint(&[RED], &report.failures.len().to_string())
        ));
    }
    out.push_str(&format!("{}\n", rule));
    out
}

// =============================================================================
// Deep dive
// =============================================================================

fn heatmap_bar(result: &ParameterResult, is_best: bool, max_abs: f64) -> (String, &'static [&'static str]) {
    let width = ((result.alpha_pct.abs() / max_abs) * HEATMAP_BAR_WIDTH as f64) as usize;
    let width = width.max(1);

    if is_best {
        (format!("{} << MAX", "█".repeat(width)), &[GREEN, BOLD])
    } else if result.alpha_pct > 0.0 && result.is_valid {
        ("█".repeat(width), &[GREEN])
    } else if result.alpha_pct > 0.0 {
        ("▓".repeat(width), &[YELLOW])
    } else if result.alpha_pct == 0.0 {
        ("░".to_string(), &[])
    } else {
        ("░".repeat(width), &[RED, DIM])
    }
}

/// Per-length alpha bars with summary statistics and a recommendation
pub fn render_heatmap(inspection: &Inspection, palette: Palette) -> String {
    let profile = &inspection.profile;
    let symbol = inspection.symbol.as_str();

    let (Some(best), Some(worst), Some((min_alpha, max_alpha))) =
        (profile.best(), profile.worst(), profile.alpha_range())
    else {
        return format!(
            "{}\n",
            palette.paint(&[YELLOW], &format!("  No data to display for {}.", symbol))
        );
    };
    let max_abs = max_alpha.abs().max(min_alpha.abs()).max(1.0);

    let rule = palette.paint(&[CYAN, BOLD], &"=".repeat(75));
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", rule));
    out.push_str(&format!(
        "{}\n",
        palette.paint(&[CYAN, BOLD], &format!("  DEEP DIVE INSPECTION: {}", symbol))
    ));
    out.push_str(&format!("{}\n\n", rule));
    out.push_str(&format!(
        "  DI Length Range: {} | Bars: {} | Last Close: {}\n",
        palette.paint(&[YELLOW], &profile.range.to_string()),
        inspection.bar_count,
        format_price(inspection.close_price)
    ));
    out.push_str(&format!(
        "  Best: {} (Alpha: {})\n",
        palette.paint(&[GREEN], &format!("DI={}", best.parameter)),
        palette.paint(&[GREEN], &format_alpha(best.alpha_pct))
    ));
    out.push_str(&format!(
        "  Worst: {} (Alpha: {})\n\n",
        palette.paint(&[RED], &format!("DI={}", worst.parameter)),
        palette.paint(&[RED], &format_alpha(worst.alpha_pct))
    ));

    out.push_str(&format!(
        "{}\n",
        palette.paint(&[BOLD], &format!("  {:<4} {:<10} {:<7} {}", "Len", "Alpha", "Trades", "Chart"))
    ));
    out.push_str(&format!("  {}\n", "-".repeat(70)));

    for r in profile.results() {
        let (bar, style) = heatmap_bar(r, r.parameter == best.parameter, max_abs);
        let row = format!(
            "  {:<4} {:<10} {:<7} {}",
            r.parameter,
            format_alpha(r.alpha_pct),
            r.trade_count,
            bar
        );
        out.push_str(&format!("{}\n", palette.paint(style, &row)));
    }
    out.push_str(&format!("  {}\n\n", "-".repeat(70)));

    let total = profile.len();
    out.push_str(&format!("  Valid Lengths: {}/{}\n", profile.valid_count(), total));
    out.push_str(&format!("  Positive Alpha: {}/{}\n", profile.positive_alpha_count(), total));
    out.push_str(&format!(
        "  Alpha Range: {} to {}\n",
        format_alpha(min_alpha),
        format_alpha(max_alpha)
    ));
    if let Some(avg) = profile.average_alpha() {
        out.push_str(&format!("  Average Alpha: {}\n", format_alpha(avg)));
    }
    if let Some(std_dev) = profile.alpha_std_dev() {
        out.push_str(&format!("  Alpha Std Dev: {:.1}%\n", std_dev));
    }

    out.push_str(&format!("\n{}\n", palette.paint(&[CYAN, BOLD], "  RECOMMENDATION:")));
    if best.is_valid {
        out.push_str(&format!(
            "{}\n",
            palette.paint(
                &[GREEN, BOLD],
                &format!(
                    "  Use DI Length = {} for optimal Alpha ({})",
                    best.parameter,
                    format_alpha(best.alpha_pct)
                )
            )
        ));
    } else {
        out.push_str(&format!(
            "{}\n",
            palette.paint(
                &[YELLOW],
                &format!("  Best DI = {} but fails guardrails. Consider other stocks.", best.parameter)
            )
        ));
    }
    out.push_str(&format!("\n{}\n", palette.paint(&[CYAN], &"=".repeat(75))));
    out
}
