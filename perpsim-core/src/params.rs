//! Strategy parameters and their construction-time validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration. Raised at construction, never silently clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("minPositionSize must be > 0, got {0}")]
    NonPositiveMinPosition(f64),
    #[error("maxPositionSize ({max}) must be >= minPositionSize ({min})")]
    MaxBelowMin { min: f64, max: f64 },
    #[error("defaultLeverage must be >= 1, got {0}")]
    LeverageBelowOne(f64),
    #[error("maxLeverage ({max}) must be >= defaultLeverage ({default})")]
    MaxLeverageBelowDefault { default: f64, max: f64 },
    #[error("{name} must be in (0, 100), got {value}")]
    PercentageOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must be >= 0, got {value}")]
    NegativeThreshold { name: &'static str, value: f64 },
    #[error("momentumPeriod must be >= 1")]
    ZeroMomentumPeriod,
    #[error("{name} must be > 0, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be in [0, 1), got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must be >= 1")]
    ZeroPeriod { name: &'static str },
    #[error("MACD fast period ({fast}) must be below slow period ({slow})")]
    MacdFastNotBelowSlow { fast: usize, slow: usize },
    #[error("RSI bands must satisfy 0 <= oversold ({oversold}) < overbought ({overbought}) <= 100")]
    InvalidRsiBands { oversold: f64, overbought: f64 },
    #[error("{name} must be in [0, 1], got {value}")]
    ConfidenceOutOfRange { name: &'static str, value: f64 },
}

/// Recognized strategy options.
///
/// Position sizes are in base-asset units; leverages are multiples;
/// stop-loss and take-profit are percentages of the entry price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategyParameters {
    pub min_position_size: f64,
    pub max_position_size: f64,
    pub default_leverage: f64,
    pub max_leverage: f64,
    pub funding_rate_threshold: f64,
    pub volatility_threshold: f64,
    pub momentum_period: usize,
    pub stop_loss_percentage: f64,
    pub take_profit_percentage: f64,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            min_position_size: 0.01,
            max_position_size: 1_000.0,
            default_leverage: 2.0,
            max_leverage: 5.0,
            funding_rate_threshold: 0.01,
            volatility_threshold: 0.02,
            momentum_period: 12,
            stop_loss_percentage: 5.0,
            take_profit_percentage: 15.0,
        }
    }
}

impl StrategyParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_position_size > 0.0) {
            return Err(ConfigError::NonPositiveMinPosition(self.min_position_size));
        }
        if !(self.max_position_size >= self.min_position_size) {
            return Err(ConfigError::MaxBelowMin {
                min: self.min_position_size,
                max: self.max_position_size,
            });
        }
        if !(self.default_leverage >= 1.0) {
            return Err(ConfigError::LeverageBelowOne(self.default_leverage));
        }
        if !(self.max_leverage >= self.default_leverage) {
            return Err(ConfigError::MaxLeverageBelowDefault {
                default: self.default_leverage,
                max: self.max_leverage,
            });
        }
        check_percentage("stopLossPercentage", self.stop_loss_percentage)?;
        check_percentage("takeProfitPercentage", self.take_profit_percentage)?;
        check_threshold("fundingRateThreshold", self.funding_rate_threshold)?;
        check_threshold("volatilityThreshold", self.volatility_threshold)?;
        if self.momentum_period == 0 {
            return Err(ConfigError::ZeroMomentumPeriod);
        }
        Ok(())
    }
}

fn check_percentage(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value < 100.0 {
        Ok(())
    } else {
        Err(ConfigError::PercentageOutOfRange { name, value })
    }
}

pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeThreshold { name, value })
    }
}
