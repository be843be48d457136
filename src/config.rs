//! TOML configuration loading and validation.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::schedule::{RebalanceInterval, RebalanceMode};

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Rebalance trigger strategy.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub mode: RebalanceMode,
    /// Required when the mode consults elapsed time.
    #[serde(default)]
    pub interval: Option<RebalanceInterval>,
    pub drift_threshold_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Skip trades smaller than this notional. Zero keeps every
    /// above-one-cent trade.
    #[serde(default)]
    pub min_trade_usd: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { min_trade_usd: 0.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
}

fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        if !self.strategy.drift_threshold_pct.is_finite() || self.strategy.drift_threshold_pct <= 0.0
        {
            return Err(Error::Config("drift_threshold_pct must be > 0".into()));
        }
        if self.strategy.mode.uses_interval() && self.strategy.interval.is_none() {
            return Err(Error::Config(format!(
                "interval is required for {} mode",
                self.strategy.mode
            )));
        }
        if !self.planner.min_trade_usd.is_finite() || self.planner.min_trade_usd < 0.0 {
            return Err(Error::Config("min_trade_usd must be >= 0".into()));
        }
        Ok(())
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> std::path::PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[strategy]
mode = "hybrid"
interval = "weekly"
drift_threshold_pct = 5.0

[planner]
min_trade_usd = 10.0

[logging]
dir = "./logs"
audit_file = "audit.jsonl"
"#
    }

    #[test]
    fn parse_example_config() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert_eq!(config.strategy.mode, RebalanceMode::Hybrid);
        assert_eq!(config.strategy.interval, Some(RebalanceInterval::Weekly));
        assert_eq!(config.strategy.drift_threshold_pct, 5.0);
        assert_eq!(config.planner.min_trade_usd, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn minimal_threshold_only_config() {
        let toml = r#"
[strategy]
mode = "threshold-only"
drift_threshold_pct = 3.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.planner.min_trade_usd, 0.0);
        assert_eq!(config.logging.dir, "./logs");
    }

    #[test]
    fn validate_rejects_zero_threshold() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.strategy.drift_threshold_pct = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_interval_for_fixed_mode() {
        let toml = r#"
[strategy]
mode = "fixed-interval"
drift_threshold_pct = 5.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_missing_interval_for_hybrid_mode() {
        let toml = r#"
[strategy]
mode = "hybrid"
drift_threshold_pct = 5.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn threshold_only_needs_no_interval() {
        let toml = r#"
[strategy]
mode = "threshold-only"
drift_threshold_pct = 5.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_min_trade() {
        let mut config: Config = toml::from_str(example_toml()).unwrap();
        config.planner.min_trade_usd = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn interval_parses_all_variants() {
        for (name, expected) in [
            ("daily", RebalanceInterval::Daily),
            ("weekly", RebalanceInterval::Weekly),
            ("monthly", RebalanceInterval::Monthly),
        ] {
            let toml = format!(
                "[strategy]\nmode = \"fixed-interval\"\ninterval = \"{name}\"\ndrift_threshold_pct = 5.0\n"
            );
            let config: Config = toml::from_str(&toml).unwrap();
            assert_eq!(config.strategy.interval, Some(expected));
        }
    }

    #[test]
    fn audit_path() {
        let config: Config = toml::from_str(example_toml()).unwrap();
        assert_eq!(
            config.audit_path(),
            std::path::PathBuf::from("./logs/audit.jsonl")
        );
    }
}
