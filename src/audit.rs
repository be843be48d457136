//! JSONL audit trail logging.
//!
//! Every evaluation tick appends events to an audit.jsonl file, one JSON
//! object per line. Quiet evaluations are logged too, so the trail shows
//! why nothing happened as much as why something did.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::drift::DriftReport;
use crate::error::Result;
use crate::planner::TradeInstruction;
use crate::schedule::RebalanceMode;
use crate::snapshot::NormalizedPortfolio;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

/// Convenience: log an evaluation start event.
pub fn log_evaluation_started(
    audit: &mut AuditLog,
    targets_file: &str,
    snapshot_file: &str,
) -> Result<()> {
    audit.log(
        "evaluation_started",
        serde_json::json!({
            "targets_file": targets_file,
            "snapshot_file": snapshot_file,
        }),
    )
}

/// Convenience: log the normalized snapshot.
pub fn log_snapshot(audit: &mut AuditLog, portfolio: &NormalizedPortfolio) -> Result<()> {
    let mut weights: Vec<_> = portfolio
        .current_pct
        .iter()
        .map(|(sym, pct)| (sym.as_str().to_string(), *pct))
        .collect();
    weights.sort_by(|a, b| a.0.cmp(&b.0));

    audit.log(
        "snapshot_normalized",
        serde_json::json!({
            "total_value_usd": portfolio.total_value_usd,
            "current_pct": weights
                .iter()
                .map(|(sym, pct)| serde_json::json!({ "symbol": sym, "pct": pct }))
                .collect::<Vec<_>>(),
        }),
    )
}

/// Convenience: log the drift report.
pub fn log_drift(audit: &mut AuditLog, report: &DriftReport) -> Result<()> {
    let entries: Vec<_> = report
        .entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "symbol": e.symbol.as_str(),
                "current_pct": e.current_pct,
                "target_pct": e.target_pct,
                "drift_pct": e.drift_pct,
            })
        })
        .collect();

    audit.log(
        "drift_evaluated",
        serde_json::json!({
            "entries": entries,
            "max_abs_drift": report.max_abs_drift,
            "threshold_pct": report.threshold_pct,
            "triggered": report.triggered,
        }),
    )
}

/// Convenience: log the scheduler decision.
pub fn log_decision(
    audit: &mut AuditLog,
    mode: RebalanceMode,
    due: bool,
    forced: bool,
) -> Result<()> {
    audit.log(
        "schedule_decision",
        serde_json::json!({
            "mode": format!("{mode}"),
            "due": due,
            "forced": forced,
        }),
    )
}

/// Convenience: log the emitted trade plan.
pub fn log_plan(audit: &mut AuditLog, trades: &[TradeInstruction]) -> Result<()> {
    let trade_data: Vec<_> = trades
        .iter()
        .map(|t| {
            serde_json::json!({
                "symbol": t.symbol.as_str(),
                "side": format!("{}", t.side),
                "usd_amount": t.usd_amount,
            })
        })
        .collect();

    audit.log("plan_emitted", serde_json::json!({ "trades": trade_data }))
}
