//! Evaluation pipeline: validate → normalize → drift → schedule → plan.
//!
//! [`evaluate`] is the pure core, invoked once per user per evaluation tick;
//! callers hand it an immutable snapshot and independent per-user state, so
//! concurrent evaluations across users share nothing. [`run`] wraps it with
//! file loading, audit logging, and console output for the CLI.

use chrono::{DateTime, Utc};
use log::info;

use crate::allocation::AllocationSet;
use crate::audit::{self, AuditLog};
use crate::config::{Config, StrategyConfig};
use crate::drift::{self, DriftReport};
use crate::error::Result;
use crate::planner::{self, Side, TradeInstruction};
use crate::schedule;
use crate::snapshot::HoldingsSnapshot;

/// Options for an evaluation run.
pub struct RunOptions {
    /// Manual trigger: plan even when the scheduler says not due.
    pub force: bool,
    /// When this portfolio last rebalanced; `None` if never.
    pub last_rebalance_at: Option<DateTime<Utc>>,
    pub targets_file: String,
    pub snapshot_file: String,
}

/// Outcome of one evaluation tick.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub total_value_usd: f64,
    pub drift: DriftReport,
    /// Scheduler verdict (before any manual override).
    pub due: bool,
    /// Plan is empty when the evaluation was not due and not forced.
    pub plan: Vec<TradeInstruction>,
}

/// Run the full pipeline over in-memory inputs.
///
/// Does no I/O and never reads the clock; the caller passes `now` and owns
/// persisting `last_rebalance_at` after the plan is confirmed executed.
pub fn evaluate(
    allocations: &AllocationSet,
    snapshot: &HoldingsSnapshot,
    strategy: &StrategyConfig,
    min_trade_usd: f64,
    last_rebalance_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    force: bool,
) -> Result<Evaluation> {
    allocations.validate()?;
    let portfolio = snapshot.normalize()?;
    let targets = allocations.as_target_pairs();

    let drift = drift::evaluate(&portfolio.current_pct, &targets, strategy.drift_threshold_pct);
    let due = schedule::should_run(
        strategy.mode,
        strategy.interval,
        last_rebalance_at,
        now,
        &drift,
    );

    let plan = if due || force {
        planner::plan(
            &portfolio.current_pct,
            &targets,
            portfolio.total_value_usd,
            min_trade_usd,
        )?
    } else {
        Vec::new()
    };

    Ok(Evaluation {
        total_value_usd: portfolio.total_value_usd,
        drift,
        due,
        plan,
    })
}

/// Execute a full evaluation run with audit trail and console output.
pub fn run(
    config: &Config,
    allocations: &AllocationSet,
    snapshot: &HoldingsSnapshot,
    opts: &RunOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut audit_log = AuditLog::open(&config.audit_path())?;
    audit::log_evaluation_started(&mut audit_log, &opts.targets_file, &opts.snapshot_file)?;

    let evaluation = evaluate(
        allocations,
        snapshot,
        &config.strategy,
        config.planner.min_trade_usd,
        opts.last_rebalance_at,
        now,
        opts.force,
    )?;

    // Re-normalize for the audit record; cheap and side-effect free
    let portfolio = snapshot.normalize()?;
    audit::log_snapshot(&mut audit_log, &portfolio)?;
    audit::log_drift(&mut audit_log, &evaluation.drift)?;
    audit::log_decision(
        &mut audit_log,
        config.strategy.mode,
        evaluation.due,
        opts.force,
    )?;

    println!(
        "Portfolio value: ${:.2} ({} mode, {:.2}% threshold)\n",
        evaluation.total_value_usd, config.strategy.mode, config.strategy.drift_threshold_pct,
    );
    print!("{}", evaluation.drift);

    info!(
        "mode={} max_drift={:.2}% due={} forced={}",
        config.strategy.mode, evaluation.drift.max_abs_drift, evaluation.due, opts.force,
    );

    if !evaluation.due && !opts.force {
        println!("\nNo rebalance due.");
        audit_log.log_simple("no_rebalance_due")?;
        return Ok(());
    }

    if evaluation.plan.is_empty() {
        println!("\nPortfolio within tolerance — nothing to trade.");
        audit_log.log_simple("no_trades_needed")?;
        return Ok(());
    }

    audit::log_plan(&mut audit_log, &evaluation.plan)?;
    display_plan(&evaluation.plan);
    println!(
        "\nAudit logged to {}",
        config.audit_path().display()
    );

    Ok(())
}

/// Show the drift report without planning trades.
pub fn show_drift(
    allocations: &AllocationSet,
    snapshot: &HoldingsSnapshot,
    threshold_pct: f64,
) -> Result<()> {
    allocations.validate()?;
    let portfolio = snapshot.normalize()?;
    let targets = allocations.as_target_pairs();

    let report = drift::evaluate(&portfolio.current_pct, &targets, threshold_pct);

    println!("Portfolio value: ${:.2}\n", portfolio.total_value_usd);
    print!("{report}");
    Ok(())
}

/// Compute and display a trade plan unconditionally (manual trigger).
pub fn run_plan(
    config: &Config,
    allocations: &AllocationSet,
    snapshot: &HoldingsSnapshot,
) -> Result<()> {
    allocations.validate()?;
    let portfolio = snapshot.normalize()?;
    let targets = allocations.as_target_pairs();

    let trades = planner::plan(
        &portfolio.current_pct,
        &targets,
        portfolio.total_value_usd,
        config.planner.min_trade_usd,
    )?;

    println!("Portfolio value: ${:.2}", portfolio.total_value_usd);
    if trades.is_empty() {
        println!("\nPortfolio within tolerance — nothing to trade.");
        return Ok(());
    }
    display_plan(&trades);
    Ok(())
}

fn display_plan(trades: &[TradeInstruction]) {
    println!("\nTRADE PLAN:");
    println!("  {:>3}  {:6} {:8} {:>12}", "#", "Side", "Asset", "Amount");

    for (i, trade) in trades.iter().enumerate() {
        println!(
            "  {:>3}  {:6} {:8} ${:>11.2}",
            i + 1,
            format!("{}", trade.side),
            trade.symbol,
            trade.usd_amount,
        );
    }

    let sell_total: f64 = trades
        .iter()
        .filter(|t| t.side == Side::Sell)
        .map(|t| t.usd_amount)
        .sum();
    let buy_total: f64 = trades
        .iter()
        .filter(|t| t.side == Side::Buy)
        .map(|t| t.usd_amount)
        .sum();
    println!("\n  Sells: ${sell_total:.2}  Buys: ${buy_total:.2}");
}
