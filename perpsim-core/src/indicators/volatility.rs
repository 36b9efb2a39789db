//! Volatility — standard deviation of simple returns.

use super::std_dev;

/// Simple returns: r[t] = (p[t] - p[t-1]) / p[t-1]. Length N - 1.
///
/// A zero previous price yields a 0.0 return rather than infinity.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { (w[1] - w[0]) / w[0] })
        .collect()
}

/// Stddev of the last `window` simple returns.
///
/// Uses every available return when the series is shorter than `window + 1`
/// prices, and returns 0.0 when fewer than two returns exist.
pub fn volatility(prices: &[f64], window: usize) -> f64 {
    let start = prices.len().saturating_sub(window + 1);
    std_dev(&simple_returns(&prices[start..]))
}

/// Trailing volatility for every bar with `window` returns behind it.
/// Output length: N - window (empty when N <= window).
pub fn rolling_volatility(prices: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || prices.len() <= window {
        return Vec::new();
    }
    simple_returns(prices).windows(window).map(std_dev).collect()
}
