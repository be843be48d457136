//! Error types for the rebalancing engine.

use std::path::PathBuf;

/// All errors that can occur during rebalancer operation.
///
/// Every variant is a caller-input or environment problem surfaced
/// immediately. Nothing here is retried or swallowed internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("allocation error: {0}")]
    Allocation(String),

    #[error("duplicate asset: {0}")]
    DuplicateAsset(String),

    #[error("target percentages sum to {sum:.2}, expected 100.00 (±0.01)")]
    AllocationSumInvalid { sum: f64 },

    #[error("target percentage for {symbol} is {pct} (must be within 0..=100)")]
    PercentageOutOfRange { symbol: String, pct: f64 },

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("portfolio is empty or has zero total value")]
    EmptyPortfolio,

    #[error("portfolio value {0} is not a usable planning basis")]
    InvalidPortfolioValue(f64),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("audit log error: {0}")]
    Audit(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
