//! Run configuration — TOML-backed, content-addressed.
//!
//! A [`RunConfig`] captures everything needed to reproduce a comparison
//! run: instruments, date range, capital split, trigger policy, and
//! frictions. Its BLAKE3 hash is the run ID, so identical configs map
//! to identical artifact directories.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rebalab_core::{BacktestParams, TriggerSpec};

/// Content hash identifying a run (hex-encoded BLAKE3 of the config).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The `[backtest]` table: instruments, window, and capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    /// Symbol driving the rebalanced strategy.
    pub leveraged_symbol: String,
    /// Symbol projected as the buy-and-hold benchmark.
    pub benchmark_symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub init_cash: f64,
    /// Fraction of capital held as stock when balanced.
    pub target_ratio: f64,
}

impl Default for BacktestSection {
    /// The pairing from the original study: a daily-2x Taiwan 50 ETF
    /// rebalanced against its unleveraged parent, over a decade.
    fn default() -> Self {
        Self {
            leveraged_symbol: "00631L.TW".to_string(),
            benchmark_symbol: "0050.TW".to_string(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            init_cash: 1_000_000.0,
            target_ratio: 0.5,
        }
    }
}

/// The `[costs]` table: per-trade frictions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostsSection {
    pub commission_rate: f64,
    /// Transaction tax, charged on sells only.
    pub tax_rate: f64,
}

impl Default for CostsSection {
    fn default() -> Self {
        Self {
            commission_rate: 0.001425,
            tax_rate: 0.003,
        }
    }
}

/// Serializable configuration for one comparison run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub trigger: TriggerSpec,
    #[serde(default)]
    pub costs: CostsSection,
}

impl RunConfig {
    /// Load and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks only the config layer can make. Numeric ranges on
    /// capital, ratio, and frictions belong to the engine validator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.leveraged_symbol.is_empty() {
            return Err(ConfigError::Invalid(
                "leveraged_symbol must be non-empty".to_string(),
            ));
        }
        if self.backtest.benchmark_symbol.is_empty() {
            return Err(ConfigError::Invalid(
                "benchmark_symbol must be non-empty".to_string(),
            ));
        }
        if self.backtest.start_date >= self.backtest.end_date {
            return Err(ConfigError::Invalid(format!(
                "start_date {} must be before end_date {}",
                self.backtest.start_date, self.backtest.end_date
            )));
        }
        Ok(())
    }

    /// Engine parameters carried by this config.
    pub fn params(&self) -> BacktestParams {
        BacktestParams {
            init_cash: self.backtest.init_cash,
            target_ratio: self.backtest.target_ratio,
            commission_rate: self.costs.commission_rate,
            tax_rate: self.costs.tax_rate,
        }
    }

    /// Deterministic content hash for this configuration.
    ///
    /// Reruns of an identical config land in the same artifact
    /// directory and overwrite it instead of piling up copies.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backtest.leveraged_symbol, "00631L.TW");
        assert_eq!(config.backtest.benchmark_symbol, "0050.TW");

        let params = config.params();
        assert_eq!(params.init_cash, 1_000_000.0);
        assert_eq!(params.target_ratio, 0.5);
        assert_eq!(params.commission_rate, 0.001425);
        assert_eq!(params.tax_rate, 0.003);
    }

    #[test]
    fn run_id_is_deterministic() {
        let a = RunConfig::default();
        let b = RunConfig::default();
        assert_eq!(a.run_id(), b.run_id());
        assert_eq!(a.run_id().len(), 64);
    }

    #[test]
    fn run_id_changes_with_parameters() {
        let base = RunConfig::default();
        let mut tweaked = base.clone();
        tweaked.trigger = TriggerSpec::RelativeDeviation { threshold: 0.25 };
        assert_ne!(base.run_id(), tweaked.run_id());

        let mut costs = base.clone();
        costs.costs.commission_rate = 0.0;
        assert_ne!(base.run_id(), costs.run_id());
    }

    #[test]
    fn parses_full_toml() {
        let text = r#"
            [backtest]
            leveraged_symbol = "TQQQ"
            benchmark_symbol = "QQQ"
            start_date = "2020-01-01"
            end_date = "2023-12-31"
            init_cash = 50000.0
            target_ratio = 0.6

            [trigger]
            type = "PRICE_CHANGE"
            threshold = 0.2

            [costs]
            commission_rate = 0.0005
            tax_rate = 0.0
        "#;
        let config = RunConfig::from_toml(text).unwrap();
        assert_eq!(config.backtest.leveraged_symbol, "TQQQ");
        assert_eq!(config.backtest.target_ratio, 0.6);
        assert_eq!(config.trigger.name(), "price_change");
        assert_eq!(config.trigger.threshold(), 0.2);
        assert_eq!(config.costs.tax_rate, 0.0);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = RunConfig::from_toml("").unwrap();
        assert_eq!(config, RunConfig::default());

        let partial = RunConfig::from_toml(
            r#"
            [trigger]
            type = "ABSOLUTE_OFFSET"
            threshold = 0.1
        "#,
        )
        .unwrap();
        assert_eq!(partial.backtest, BacktestSection::default());
        assert_eq!(partial.trigger.name(), "absolute_offset");
    }

    #[test]
    fn rejects_inverted_date_range() {
        let text = r#"
            [backtest]
            start_date = "2024-01-01"
            end_date = "2020-01-01"
        "#;
        let err = RunConfig::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn rejects_empty_symbol() {
        let text = r#"
            [backtest]
            leveraged_symbol = ""
        "#;
        let err = RunConfig::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = RunConfig::from_toml("backtest = not toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [trigger]
            type = "RELATIVE_DEVIATION"
            threshold = 0.3
        "#
        )
        .unwrap();

        let config = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(config.trigger.threshold(), 0.3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RunConfig::from_file(Path::new("/nonexistent/run.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn json_roundtrip_preserves_config() {
        let config = RunConfig {
            trigger: TriggerSpec::PriceChange { threshold: 0.15 },
            ..RunConfig::default()
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: RunConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
