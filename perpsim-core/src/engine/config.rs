//! Backtest run configuration.

use serde::{Deserialize, Serialize};

use crate::params::ConfigError;

/// Configuration for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    /// Fraction of notional charged on every fill.
    pub commission_rate: f64,
    /// Adverse price move applied to every fill, as a fraction of price.
    pub slippage_rate: f64,
    /// Close whatever is still open on the last bar instead of reporting it
    /// as `open_position`.
    pub close_open_positions_at_end: bool,
    /// Check stop-loss / take-profit levels on each close before the signal.
    pub use_brackets: bool,
    pub require_volume_confirmation: bool,
    /// Annual risk-free rate used by the Sharpe ratio.
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            commission_rate: 0.001,
            slippage_rate: 0.001,
            close_open_positions_at_end: false,
            use_brackets: true,
            require_volume_confirmation: false,
            risk_free_rate: 0.02,
            periods_per_year: 252.0,
        }
    }
}

impl BacktestConfig {
    pub fn new(initial_capital: f64, commission_rate: f64, slippage_rate: f64) -> Self {
        Self {
            initial_capital,
            commission_rate,
            slippage_rate,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital > 0.0) || !self.initial_capital.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "initial_capital",
                value: self.initial_capital,
            });
        }
        check_rate("commission_rate", self.commission_rate)?;
        check_rate("slippage_rate", self.slippage_rate)?;
        if !(self.periods_per_year > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "periods_per_year",
                value: self.periods_per_year,
            });
        }
        Ok(())
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { name, value })
    }
}
