//! Drift evaluation: current portfolio weights vs target allocations.
//!
//! Pure comparison over values already in memory. Given identical inputs
//! the report is identical; nothing here reads the clock.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::types::Symbol;

/// One asset's drift entry.
#[derive(Debug, Clone, Serialize)]
pub struct DriftEntry {
    pub symbol: Symbol,
    pub current_pct: f64,
    pub target_pct: f64,
    /// current − target; positive means overweight.
    pub drift_pct: f64,
}

/// Output of a drift evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    /// Per-asset entries, sorted by symbol.
    pub entries: Vec<DriftEntry>,
    pub max_abs_drift: f64,
    pub threshold_pct: f64,
    /// True iff `max_abs_drift >= threshold_pct`. A drift exactly at the
    /// threshold fires.
    pub triggered: bool,
}

/// Compare current weights against targets.
///
/// Operates on the union of assets appearing on either side; a missing entry
/// defaults to 0%. Assets held but absent from targets therefore show the
/// full position as drift (liquidation candidates), and targeted-but-unheld
/// assets show as underweight.
pub fn evaluate(
    current_pct: &FxHashMap<Symbol, f64>,
    targets: &[(Symbol, f64)],
    threshold_pct: f64,
) -> DriftReport {
    let target_map: FxHashMap<Symbol, f64> = targets.iter().copied().collect();

    let mut all_symbols: Vec<Symbol> = current_pct.keys().copied().collect();
    for &(sym, _) in targets {
        if !current_pct.contains_key(&sym) {
            all_symbols.push(sym);
        }
    }
    all_symbols.sort();
    all_symbols.dedup();

    let mut entries = Vec::with_capacity(all_symbols.len());
    let mut max_abs_drift = 0.0_f64;

    for sym in all_symbols {
        let current = current_pct.get(&sym).copied().unwrap_or(0.0);
        let target = target_map.get(&sym).copied().unwrap_or(0.0);
        let drift = current - target;
        max_abs_drift = max_abs_drift.max(drift.abs());

        entries.push(DriftEntry {
            symbol: sym,
            current_pct: current,
            target_pct: target,
            drift_pct: drift,
        });
    }

    DriftReport {
        entries,
        max_abs_drift,
        threshold_pct,
        triggered: max_abs_drift >= threshold_pct,
    }
}

impl std::fmt::Display for DriftReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DRIFT:")?;
        writeln!(
            f,
            "  {:8} {:>10} {:>10} {:>10}",
            "Asset", "Current%", "Target%", "Drift%"
        )?;
        for e in &self.entries {
            writeln!(
                f,
                "  {:8} {:>9.2}% {:>9.2}% {:>+9.2}%",
                e.symbol, e.current_pct, e.target_pct, e.drift_pct,
            )?;
        }
        writeln!(
            f,
            "\n  Max drift: {:.2}% ({} {:.2}% threshold)",
            self.max_abs_drift,
            if self.triggered { ">=" } else { "<" },
            self.threshold_pct,
        )?;
        Ok(())
    }
}
