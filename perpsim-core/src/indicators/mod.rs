//! Technical indicators over a close-price series.
//!
//! Every function here is pure: the same input slice always produces the same
//! output, and no value depends on prices after the bar it describes.
//!
//! The free functions return compact series (only the bars where the
//! indicator is defined). `IndicatorEngine` right-aligns them back onto the
//! bar index as `Option<f64>` so the backtest can look values up per bar.

pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use bollinger::{bollinger_bands, BollingerBands};
pub use ema::ema;
pub use engine::{IndicatorEngine, IndicatorSettings, IndicatorSnapshot};
pub use macd::{macd, MacdParams, MacdSeries};
pub use momentum::{latest_momentum, momentum};
pub use rsi::rsi;
pub use sma::sma;
pub use volatility::{rolling_volatility, simple_returns, volatility};

/// Arithmetic mean. 0.0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by N). 0.0 for fewer than 2 values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Right-align a compact series onto `len` bars.
///
/// The last value of `series` lands on bar `len - 1`; bars before the first
/// value are `None`.
pub(crate) fn align(series: &[f64], len: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; len];
    let offset = len.saturating_sub(series.len());
    for (slot, &v) in out.iter_mut().skip(offset).zip(series) {
        *slot = Some(v);
    }
    out
}

/// Build a close series with a linear ramp: `start, start + step, ...`.
#[cfg(test)]
pub fn ramp(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
