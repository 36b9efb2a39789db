//! Relative Strength Index (RSI).
//!
//! For each bar with `period` prior price changes:
//!   gains  = sum of positive changes in the window
//!   losses = sum of |negative changes| in the window
//!   RSI    = 100 - 100 / (1 + gains / losses)
//! Output length: N - period (empty when N <= period).
//! Edge cases: losses == 0 → 100; gains == losses == 0 → 50 (no movement).

pub fn rsi(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() <= period {
        return Vec::new();
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    changes
        .windows(period)
        .map(|window| {
            let mut gains = 0.0;
            let mut losses = 0.0;
            for &ch in window {
                if ch > 0.0 {
                    gains += ch;
                } else {
                    losses -= ch;
                }
            }
            rsi_from_sums(gains, losses)
        })
        .collect()
}

fn rsi_from_sums(gains: f64, losses: f64) -> f64 {
    if losses == 0.0 && gains == 0.0 {
        50.0
    } else if losses == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + gains / losses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, ramp};

    #[test]
    fn rsi_all_gains_saturates() {
        let out = rsi(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0], 3);
        assert_eq!(out.len(), 3);
        for v in out {
            assert_approx(v, 100.0, 1e-9);
        }
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let out = rsi(&[105.0, 104.0, 103.0, 102.0], 3);
        assert_approx(out[0], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_is_neutral() {
        let out = rsi(&[100.0; 20], 14);
        assert!(out.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn rsi_mixed_known_value() {
        // changes: +0.34, -0.25, -0.48 → gains 0.34, losses 0.73
        let out = rsi(&[44.0, 44.34, 44.09, 43.61], 3);
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(out[0], expected, 1e-9);
    }

    #[test]
    fn rsi_window_rolls() {
        // Second window drops the first +1 change and adds a -1 change.
        let out = rsi(&[10.0, 11.0, 12.0, 11.0], 2);
        assert_eq!(out.len(), 2);
        assert_approx(out[0], 100.0, 1e-9);
        assert_approx(out[1], 50.0, 1e-9);
    }

    #[test]
    fn rsi_short_series_is_empty() {
        assert!(rsi(&ramp(1.0, 1.0, 14), 14).is_empty());
        assert_eq!(rsi(&ramp(1.0, 1.0, 15), 14).len(), 1);
    }
}
