//! Serializable run configuration, loaded from TOML.
//!
//! ```toml
//! name = "sol-perp-daily"
//!
//! [data]
//! type = "csv"
//! path = "data/sol.csv"
//!
//! [strategy]
//! stopLossPercentage = 5.0
//! takeProfitPercentage = 15.0
//!
//! [backtest]
//! initial_capital = 10000.0
//! commission_rate = 0.001
//! slippage_rate = 0.001
//! ```
//!
//! Every section falls back to its defaults when omitted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use perpsim_core::engine::BacktestConfig;
use perpsim_core::goal::GoalConfig;
use perpsim_core::indicators::IndicatorSettings;
use perpsim_core::signals::{LinearTrendPredictor, NoChangePredictor, PricePredictor, SignalConfig};
use perpsim_core::StrategyParameters;

use crate::synthetic::SyntheticSpec;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid parameters: {0}")]
    Invalid(#[from] perpsim_core::ConfigError),
    #[error("predictor window must be >= 2, got {0}")]
    PredictorWindow(usize),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the price series comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataSource {
    /// CSV file with `timestamp,open,high,low,close,volume` columns. Relative
    /// paths resolve against the config file's directory.
    Csv { path: PathBuf },
    /// Deterministic random walk.
    Synthetic(SyntheticSpec),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Synthetic(SyntheticSpec::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredictorConfig {
    LinearTrend { window: usize, horizon: usize },
    NoChange,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self::LinearTrend {
            window: 20,
            horizon: 5,
        }
    }
}

impl PredictorConfig {
    pub fn build(&self) -> Result<Box<dyn PricePredictor>, ConfigError> {
        match *self {
            Self::LinearTrend { window, horizon } => {
                if window < 2 {
                    return Err(ConfigError::PredictorWindow(window));
                }
                Ok(Box::new(LinearTrendPredictor::new(window, horizon)))
            }
            Self::NoChange => Ok(Box::new(NoChangePredictor)),
        }
    }
}

/// Everything needed to reproduce a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub name: String,
    pub data: DataSource,
    pub strategy: StrategyParameters,
    pub backtest: BacktestConfig,
    pub goal: GoalConfig,
    pub signals: SignalConfig,
    pub indicators: IndicatorSettings,
    pub predictor: PredictorConfig,
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. Relative CSV paths are resolved against the file's
    /// directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let (DataSource::Csv { path: csv }, Some(dir)) = (&mut config.data, path.parent()) {
            if csv.is_relative() {
                *csv = dir.join(&*csv);
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy.validate()?;
        self.backtest.validate()?;
        // The engine takes the momentum period from the strategy section.
        let indicators = IndicatorSettings {
            momentum_period: self.strategy.momentum_period,
            ..self.indicators.clone()
        };
        indicators.validate()?;
        self.signals.validate()?;
        self.predictor.build()?;
        Ok(())
    }

    /// Deterministic hash of the whole configuration.
    ///
    /// Two runs with identical configs share a RunId.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = RunConfig::from_toml("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert!(matches!(config.data, DataSource::Synthetic(_)));
    }

    #[test]
    fn parses_sections() {
        let toml_str = r#"
            name = "sol"

            [data]
            type = "csv"
            path = "prices.csv"

            [strategy]
            maxPositionSize = 50.0
            stopLossPercentage = 3.0

            [backtest]
            initial_capital = 25000.0
            close_open_positions_at_end = true

            [goal]
            goal = 2000000.0

            [predictor]
            type = "no_change"
        "#;
        let config = RunConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.name, "sol");
        assert_eq!(
            config.data,
            DataSource::Csv {
                path: PathBuf::from("prices.csv")
            }
        );
        assert_eq!(config.strategy.max_position_size, 50.0);
        assert_eq!(config.strategy.stop_loss_percentage, 3.0);
        assert_eq!(config.strategy.take_profit_percentage, 15.0);
        assert_eq!(config.backtest.initial_capital, 25_000.0);
        assert!(config.backtest.close_open_positions_at_end);
        assert_eq!(config.goal.goal, 2_000_000.0);
        assert_eq!(config.goal.horizon_days, 1825.0);
        assert_eq!(config.predictor, PredictorConfig::NoChange);
    }

    #[test]
    fn invalid_strategy_fails_fast() {
        let err = RunConfig::from_toml("[strategy]\nstopLossPercentage = 150.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn indicator_and_signal_sections_are_checked() {
        let err = RunConfig::from_toml("[indicators]\nrsi_period = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(RunConfig::from_toml("[indicators]\nvolume_period = 0\n").is_err());
        assert!(RunConfig::from_toml("[indicators]\nbollinger_multiplier = -1.0\n").is_err());
        assert!(RunConfig::from_toml("[signals]\noversold = 90.0\noverbought = 10.0\n").is_err());
    }

    #[test]
    fn tiny_predictor_window_rejected() {
        let err = RunConfig::from_toml("[predictor]\ntype = \"linear_trend\"\nwindow = 1\nhorizon = 3\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::PredictorWindow(1)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            RunConfig::from_toml("[backtest\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let a = RunConfig::default();
        let mut b = a.clone();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        b.strategy.take_profit_percentage = 20.0;
        assert_ne!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = RunConfig::default();
        config.name = "roundtrip".into();
        config.backtest.use_brackets = false;
        let text = toml::to_string(&config).unwrap();
        assert_eq!(RunConfig::from_toml(&text).unwrap(), config);
    }
}
