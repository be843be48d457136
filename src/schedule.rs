//! Rebalance scheduling policy: is "now" a valid rebalance moment.
//!
//! The last-run timestamp is an explicit parameter. The caller owns updating
//! it, and only after trades are confirmed executed; updating earlier would
//! silently skip a needed rebalance after a failed execution.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::drift::DriftReport;

/// When a rebalance may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RebalanceMode {
    /// Time-based only: run whenever the interval has elapsed.
    FixedInterval,
    /// Drift-based only: run whenever the drift threshold is crossed.
    ThresholdOnly,
    /// Either condition — the user gets the safety net of both.
    Hybrid,
}

impl RebalanceMode {
    /// Whether this mode consults the time interval at all.
    pub fn uses_interval(self) -> bool {
        matches!(self, RebalanceMode::FixedInterval | RebalanceMode::Hybrid)
    }
}

impl std::fmt::Display for RebalanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebalanceMode::FixedInterval => write!(f, "fixed-interval"),
            RebalanceMode::ThresholdOnly => write!(f, "threshold-only"),
            RebalanceMode::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Interval between time-based rebalances.
///
/// Mapped to fixed durations (monthly = 30 days), not calendar-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceInterval {
    Daily,
    Weekly,
    Monthly,
}

impl RebalanceInterval {
    pub fn duration(self) -> Duration {
        match self {
            RebalanceInterval::Daily => Duration::hours(24),
            RebalanceInterval::Weekly => Duration::days(7),
            RebalanceInterval::Monthly => Duration::days(30),
        }
    }
}

impl std::fmt::Display for RebalanceInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebalanceInterval::Daily => write!(f, "daily"),
            RebalanceInterval::Weekly => write!(f, "weekly"),
            RebalanceInterval::Monthly => write!(f, "monthly"),
        }
    }
}

/// Decide whether a rebalance may run now.
///
/// A portfolio that has never been rebalanced (`last_rebalance_at == None`)
/// is always due under the interval-bearing modes.
pub fn should_run(
    mode: RebalanceMode,
    interval: Option<RebalanceInterval>,
    last_rebalance_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    drift: &DriftReport,
) -> bool {
    match mode {
        RebalanceMode::FixedInterval => interval_elapsed(interval, last_rebalance_at, now),
        RebalanceMode::ThresholdOnly => drift.triggered,
        RebalanceMode::Hybrid => {
            interval_elapsed(interval, last_rebalance_at, now) || drift.triggered
        }
    }
}

fn interval_elapsed(
    interval: Option<RebalanceInterval>,
    last_rebalance_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match last_rebalance_at {
        None => true,
        Some(last) => match interval {
            Some(i) => now - last >= i.duration(),
            // Config validation requires an interval for interval-bearing
            // modes; without one, elapsed time alone can never trigger.
            None => false,
        },
    }
}
