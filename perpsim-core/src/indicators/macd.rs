//! Moving Average Convergence Divergence (MACD).
//!
//! macd_line = EMA(fast) - EMA(slow), aligned on the slow EMA's first bar.
//! signal    = EMA(macd_line, signal_period).
//! histogram = macd_line - signal, aligned on the signal's first bar.

use serde::{Deserialize, Serialize};

use super::ema::ema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

impl MacdParams {
    /// Closes needed before the signal line has a value.
    pub fn warmup_bars(&self) -> usize {
        self.slow.max(self.fast) + self.signal.saturating_sub(1)
    }
}

/// The three MACD series.
///
/// `macd_line` has N - slow + 1 values. `signal` and `histogram` share a
/// length and are right-aligned with `macd_line`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd_line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    /// The tail of `macd_line` that lines up index-for-index with `signal`.
    pub fn aligned_macd_line(&self) -> &[f64] {
        let offset = self.macd_line.len() - self.signal.len();
        &self.macd_line[offset..]
    }
}

/// Compute MACD for `prices`.
///
/// Returns empty series when there are fewer closes than the slow period.
/// When the MACD line is shorter than the signal period, the short-series EMA
/// fallback applies: the signal equals the MACD line and the histogram is 0.
pub fn macd(prices: &[f64], params: MacdParams) -> MacdSeries {
    let slow_period = params.slow.max(params.fast);
    let fast_period = params.slow.min(params.fast);
    if fast_period == 0 || prices.len() < slow_period {
        return MacdSeries::default();
    }

    let fast = ema(prices, fast_period);
    let slow = ema(prices, slow_period);
    let skip = fast.len() - slow.len();
    let macd_line: Vec<f64> = fast[skip..]
        .iter()
        .zip(&slow)
        .map(|(f, s)| f - s)
        .collect();

    let signal = ema(&macd_line, params.signal);
    let offset = macd_line.len() - signal.len();
    let histogram = macd_line[offset..]
        .iter()
        .zip(&signal)
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd_line,
        signal,
        histogram,
    }
}
