//! # portfolio-rebalancer
//!
//! A drift-based portfolio rebalancing engine. Given current holdings,
//! target allocations, and a drift threshold, it decides whether a rebalance
//! is triggered and computes the ordered trade list that returns the
//! portfolio to target.
//!
//! The pipeline runs in four pure stages: target validation
//! ([`allocation`]), snapshot normalization ([`snapshot`]), drift
//! evaluation ([`drift`]), and trade planning ([`planner`]); [`schedule`]
//! decides whether "now" is a valid rebalance moment. [`engine`] wires the
//! stages together, and everything I/O-shaped (config, audit trail, CLI)
//! stays at the edges.
//!
//! ## Quick Start
//!
//! ```
//! use portfolio_rebalancer::allocation::AllocationSet;
//! use portfolio_rebalancer::snapshot::HoldingsSnapshot;
//! use portfolio_rebalancer::{drift, planner};
//!
//! let targets = AllocationSet::from_json(r#"{
//!     "targets": [
//!         { "symbol": "BTC", "target_pct": 60.0 },
//!         { "symbol": "ETH", "target_pct": 40.0 }
//!     ]
//! }"#).unwrap();
//!
//! let snapshot = HoldingsSnapshot::from_json(r#"{
//!     "holdings": [
//!         { "symbol": "BTC", "quantity": 1.0, "price_usd": 7000.0 },
//!         { "symbol": "ETH", "quantity": 1.0, "price_usd": 3000.0 }
//!     ]
//! }"#).unwrap();
//!
//! let portfolio = snapshot.normalize().unwrap();
//! let pairs = targets.as_target_pairs();
//!
//! // BTC sits at 70% against a 60% target: drift of 10% fires a 5% threshold
//! let report = drift::evaluate(&portfolio.current_pct, &pairs, 5.0);
//! assert!(report.triggered);
//!
//! // Sells come first so their proceeds fund the buys
//! let trades = planner::plan(
//!     &portfolio.current_pct,
//!     &pairs,
//!     portfolio.total_value_usd,
//!     0.0,
//! ).unwrap();
//! assert_eq!(trades.len(), 2);
//! assert_eq!(trades[0].symbol.as_str(), "BTC");
//! assert!((trades[0].usd_amount - 1000.0).abs() < 1e-6);
//! ```
//!
//! The trade plan is handed to an external execution collaborator; the
//! engine never tracks execution state, fees, or slippage.

pub mod allocation;
pub mod audit;
pub mod config;
pub mod drift;
pub mod engine;
pub mod error;
pub mod planner;
pub mod schedule;
pub mod snapshot;
pub mod types;

pub use drift::{DriftEntry, DriftReport};
pub use error::{Error, Result};
pub use planner::{Side, TradeInstruction};
pub use schedule::{RebalanceInterval, RebalanceMode};
pub use types::Symbol;
