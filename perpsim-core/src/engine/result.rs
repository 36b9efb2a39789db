//! Backtest output types.

use serde::{Deserialize, Serialize};

use crate::domain::{Position, Signal, Trade};
use crate::indicators::IndicatorSnapshot;
use crate::metrics;
use crate::sizers::SizedOrder;

/// Aggregate statistics of one run. Percent-valued fields are in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub total_returns: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    /// Longest run of losing trades.
    #[serde(default)]
    pub max_consecutive_losses: usize,
    pub trades: Vec<Trade>,
    /// Realized capital, starting with the initial capital.
    pub equity: Vec<f64>,
    /// Drawdown in percent for every equity point.
    pub drawdown: Vec<f64>,
    pub final_capital: f64,
    pub bars_processed: usize,
    /// Position still open at the end of the series, if it was not closed.
    pub open_position: Option<Position>,
}

impl BacktestResult {
    pub(crate) fn from_run(
        initial_capital: f64,
        risk_free_rate: f64,
        periods_per_year: f64,
        run: RunOutput,
    ) -> Self {
        let RunOutput {
            trades,
            equity,
            bars_processed,
            open_position,
        } = run;
        let drawdown = metrics::drawdown_curve(&equity);
        let final_capital = equity.last().copied().unwrap_or(initial_capital);
        Self {
            total_returns: metrics::total_return_pct(initial_capital, final_capital),
            sharpe_ratio: metrics::sharpe_ratio(&equity, risk_free_rate, periods_per_year),
            max_drawdown: metrics::max_drawdown_pct(&drawdown),
            win_rate: metrics::win_rate_pct(&trades),
            profit_factor: metrics::profit_factor(&trades),
            max_consecutive_losses: metrics::max_consecutive_losses(&trades),
            trades,
            equity,
            drawdown,
            final_capital,
            bars_processed,
            open_position,
        }
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

/// Raw loop output before statistics are derived.
#[derive(Debug, Default)]
pub(crate) struct RunOutput {
    pub trades: Vec<Trade>,
    pub equity: Vec<f64>,
    pub bars_processed: usize,
    pub open_position: Option<Position>,
}

/// One online decision: the signal for the latest bar and, when it asks for
/// a position, the order the sizer would place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub timestamp: i64,
    pub price: f64,
    pub signal: Signal,
    pub order: Option<SizedOrder>,
    pub snapshot: IndicatorSnapshot,
}
