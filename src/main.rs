//! CLI entry point for the portfolio rebalancer.

use std::path::{Path, PathBuf};
use std::process;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use portfolio_rebalancer::allocation::AllocationSet;
use portfolio_rebalancer::config::Config;
use portfolio_rebalancer::engine::{self, RunOptions};
use portfolio_rebalancer::error::Error;
use portfolio_rebalancer::snapshot::HoldingsSnapshot;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Drift-based portfolio rebalancer: targets in, trade plan out")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full evaluation tick: drift, schedule decision, trade plan
    Evaluate {
        /// Path to targets.json
        targets: PathBuf,

        /// Path to snapshot.json
        snapshot: PathBuf,

        /// When this portfolio last rebalanced (RFC 3339); omit if never
        #[arg(long)]
        last_run: Option<DateTime<Utc>>,

        /// Plan even if the scheduler says not due
        #[arg(long)]
        force: bool,
    },

    /// Show the drift report without planning trades
    Drift {
        /// Path to targets.json
        targets: PathBuf,

        /// Path to snapshot.json
        snapshot: PathBuf,
    },

    /// Compute a trade plan unconditionally (manual trigger)
    Plan {
        /// Path to targets.json
        targets: PathBuf,

        /// Path to snapshot.json
        snapshot: PathBuf,
    },

    /// Validate a target allocation file
    Validate {
        /// Path to targets.json
        targets: PathBuf,
    },
}

fn load_targets(path: &Path) -> AllocationSet {
    match AllocationSet::load(path) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("Error loading targets: {e}");
            process::exit(2);
        }
    }
}

fn load_snapshot(path: &Path) -> HoldingsSnapshot {
    match HoldingsSnapshot::load(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error loading snapshot: {e}");
            process::exit(2);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Evaluate {
            targets,
            snapshot,
            last_run,
            force,
        } => {
            let allocations = load_targets(&targets);
            let holdings = load_snapshot(&snapshot);
            let opts = RunOptions {
                force,
                last_rebalance_at: last_run,
                targets_file: targets.display().to_string(),
                snapshot_file: snapshot.display().to_string(),
            };
            engine::run(&config, &allocations, &holdings, &opts, Utc::now())
        }
        Command::Drift { targets, snapshot } => {
            let allocations = load_targets(&targets);
            let holdings = load_snapshot(&snapshot);
            engine::show_drift(&allocations, &holdings, config.strategy.drift_threshold_pct)
        }
        Command::Plan { targets, snapshot } => {
            let allocations = load_targets(&targets);
            let holdings = load_snapshot(&snapshot);
            engine::run_plan(&config, &allocations, &holdings)
        }
        Command::Validate { targets } => {
            let allocations = load_targets(&targets);
            println!("{} targets OK", allocations.targets.len());
            Ok(())
        }
    };

    if let Err(e) = result {
        match &e {
            Error::DuplicateAsset(_)
            | Error::AllocationSumInvalid { .. }
            | Error::PercentageOutOfRange { .. }
            | Error::EmptyPortfolio
            | Error::InvalidPortfolioValue(_) => {
                eprintln!("Invalid input: {e}");
                process::exit(2);
            }
            _ => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }
}
