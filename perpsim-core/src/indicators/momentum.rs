//! Momentum — fractional change over a lookback.
//!
//! momentum[t] = (close[t] - close[t-period]) / close[t-period]
//! Output length: N - period (empty when N <= period).

pub fn momentum(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() <= period {
        return Vec::new();
    }
    prices
        .iter()
        .zip(&prices[period..])
        .map(|(&then, &now)| change(then, now))
        .collect()
}

/// Momentum of the last bar, or `None` without `period` bars of history.
pub fn latest_momentum(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() <= period {
        return None;
    }
    let now = prices[prices.len() - 1];
    let then = prices[prices.len() - 1 - period];
    Some(change(then, now))
}

fn change(then: f64, now: f64) -> f64 {
    if then == 0.0 {
        0.0
    } else {
        (now - then) / then
    }
}
