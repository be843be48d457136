//! Target allocation loading and validation.
//!
//! An allocation set is a user's target portfolio: one percentage per asset,
//! summing to 100. Validation happens at this boundary; downstream components
//! assume a valid set or fail explicitly.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::Symbol;

/// Allowed deviation of the target-percentage sum from 100.
pub const SUM_EPSILON_PCT: f64 = 0.01;

/// A user's full set of target allocations.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationSet {
    pub targets: Vec<AllocationTarget>,
}

/// A single target allocation: asset ticker + percentage of portfolio.
#[derive(Debug, Clone, Deserialize)]
pub struct AllocationTarget {
    pub symbol: String,
    pub target_pct: f64,
}

impl AllocationSet {
    /// Load and validate a targets JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let set: AllocationSet = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    /// Validate the allocation set.
    ///
    /// Checks ticker hygiene, duplicates, per-target range, and that the
    /// percentages sum to 100 within [`SUM_EPSILON_PCT`].
    pub fn validate(&self) -> Result<()> {
        for t in &self.targets {
            if t.symbol.is_empty() {
                return Err(Error::Allocation("empty symbol".into()));
            }
            if !t.symbol.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
                return Err(Error::Allocation(format!(
                    "symbol '{}' is not an uppercase ticker",
                    t.symbol
                )));
            }
            if Symbol::try_new(&t.symbol).is_none() {
                return Err(Error::Allocation(format!(
                    "symbol '{}' exceeds {} bytes",
                    t.symbol,
                    Symbol::MAX_LEN
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for t in &self.targets {
            if !seen.insert(&t.symbol) {
                return Err(Error::DuplicateAsset(t.symbol.clone()));
            }
        }

        for t in &self.targets {
            if !(0.0..=100.0).contains(&t.target_pct) {
                return Err(Error::PercentageOutOfRange {
                    symbol: t.symbol.clone(),
                    pct: t.target_pct,
                });
            }
        }

        let sum: f64 = self.targets.iter().map(|t| t.target_pct).sum();
        if (sum - 100.0).abs() > SUM_EPSILON_PCT {
            return Err(Error::AllocationSumInvalid { sum });
        }

        Ok(())
    }

    /// Get the list of target symbols.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.targets.iter().map(|t| Symbol::new(&t.symbol)).collect()
    }

    /// Get (Symbol, target_pct) pairs for the drift evaluator and planner.
    pub fn as_target_pairs(&self) -> Vec<(Symbol, f64)> {
        self.targets
            .iter()
            .map(|t| (Symbol::new(&t.symbol), t.target_pct))
            .collect()
    }
}
