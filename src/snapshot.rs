//! Holdings snapshot loading and normalization.
//!
//! A snapshot is an ephemeral picture of what the user holds right now:
//! quantity and USD price per asset. Normalization turns it into
//! percentage-of-portfolio form for the drift evaluator.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::Symbol;

/// A raw holdings snapshot from the holdings collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct HoldingsSnapshot {
    pub holdings: Vec<Holding>,
}

/// One held asset: quantity and spot price.
#[derive(Debug, Clone, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub price_usd: f64,
}

impl Holding {
    /// Position value in USD.
    pub fn usd_value(&self) -> f64 {
        self.quantity * self.price_usd
    }
}

/// A snapshot in percentage-of-portfolio form.
#[derive(Debug, Clone)]
pub struct NormalizedPortfolio {
    /// Percent of total portfolio value per asset, 0–100.
    /// Zero-value assets are present at 0%, not dropped.
    pub current_pct: FxHashMap<Symbol, f64>,
    pub total_value_usd: f64,
}

impl HoldingsSnapshot {
    /// Load and validate a snapshot JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: HoldingsSnapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Validate snapshot invariants: ticker hygiene, no duplicates,
    /// non-negative finite quantities and prices.
    pub fn validate(&self) -> Result<()> {
        for h in &self.holdings {
            if h.symbol.is_empty() {
                return Err(Error::Snapshot("empty symbol".into()));
            }
            if Symbol::try_new(&h.symbol).is_none() {
                return Err(Error::Snapshot(format!(
                    "symbol '{}' exceeds {} bytes",
                    h.symbol,
                    Symbol::MAX_LEN
                )));
            }
            if !h.quantity.is_finite() || h.quantity < 0.0 {
                return Err(Error::Snapshot(format!(
                    "quantity for {} is {} (must be finite and >= 0)",
                    h.symbol, h.quantity
                )));
            }
            if !h.price_usd.is_finite() || h.price_usd < 0.0 {
                return Err(Error::Snapshot(format!(
                    "price for {} is {} (must be finite and >= 0)",
                    h.symbol, h.price_usd
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for h in &self.holdings {
            if !seen.insert(&h.symbol) {
                return Err(Error::DuplicateAsset(h.symbol.clone()));
            }
        }

        Ok(())
    }

    /// Total portfolio value in USD.
    pub fn total_value_usd(&self) -> f64 {
        self.holdings.iter().map(Holding::usd_value).sum()
    }

    /// Convert to percentage-of-portfolio form.
    ///
    /// Fails with [`Error::EmptyPortfolio`] if the snapshot is empty or the
    /// total value is zero: no percentage is computable without a value
    /// basis. Assets with zero value are kept at 0% so the drift evaluator
    /// can see under-allocation of targeted-but-unheld assets.
    pub fn normalize(&self) -> Result<NormalizedPortfolio> {
        if self.holdings.is_empty() {
            return Err(Error::EmptyPortfolio);
        }

        let total = self.total_value_usd();
        if total <= 0.0 {
            return Err(Error::EmptyPortfolio);
        }

        let mut current_pct =
            FxHashMap::with_capacity_and_hasher(self.holdings.len(), Default::default());
        for h in &self.holdings {
            let symbol = Symbol::new(&h.symbol);
            current_pct.insert(symbol, h.usd_value() / total * 100.0);
        }

        Ok(NormalizedPortfolio {
            current_pct,
            total_value_usd: total,
        })
    }
}
