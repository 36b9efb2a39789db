//! Simple Moving Average (SMA).
//!
//! SMA[t] = mean(values[t - period + 1 ..= t]).
//! Output length: N - period + 1 (empty when N < period).

pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut sum: f64 = values[..period].iter().sum();
    out.push(sum / period as f64);
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out.push(sum / period as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_known_values() {
        let out = sma(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert_eq!(out.len(), 3);
        assert_approx(out[0], 11.0, DEFAULT_EPSILON);
        assert_approx(out[1], 12.0, DEFAULT_EPSILON);
        assert_approx(out[2], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_short_series_is_empty() {
        assert!(sma(&[1.0, 2.0], 3).is_empty());
        assert!(sma(&[1.0, 2.0], 0).is_empty());
    }
}
