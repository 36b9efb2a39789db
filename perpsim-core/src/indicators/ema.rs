//! Exponential Moving Average (EMA).
//!
//! Seed: simple average of the first `period` values.
//! Recursive: EMA[t] = value[t] * k + EMA[t-1] * (1 - k), k = 2 / (period + 1).
//! Output length: N - period + 1.

/// EMA of `values`.
///
/// When `values` is shorter than `period` (or `period` is 0) the input is
/// returned unchanged. Callers that need a strict warm-up must check the
/// length first; `IndicatorEngine` does.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return values.to_vec();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    let mut prev = seed;
    for &v in &values[period..] {
        prev = v * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, ramp, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_input() {
        let out = ema(&[100.0, 200.0, 300.0], 1);
        assert_eq!(out, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn ema_3_known_values() {
        // k = 0.5, seed = mean(10, 11, 12) = 11
        // 13 * 0.5 + 11 * 0.5 = 12; 14 * 0.5 + 12 * 0.5 = 13
        let out = ema(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert_eq!(out.len(), 3);
        assert_approx(out[0], 11.0, DEFAULT_EPSILON);
        assert_approx(out[1], 12.0, DEFAULT_EPSILON);
        assert_approx(out[2], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_output_length() {
        let values = ramp(1.0, 1.0, 40);
        assert_eq!(ema(&values, 12).len(), 29);
        assert_eq!(ema(&values, 40).len(), 1);
    }

    #[test]
    fn short_series_returned_unchanged() {
        let values = [5.0, 6.0];
        assert_eq!(ema(&values, 9), values.to_vec());
        assert_eq!(ema(&values, 0), values.to_vec());
    }

    #[test]
    fn ema_of_constant_is_constant() {
        let out = ema(&[42.0; 30], 10);
        for v in out {
            assert_approx(v, 42.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn ema_converges_after_level_shift() {
        let mut values = vec![10.0; 10];
        values.extend(std::iter::repeat(50.0).take(200));
        let out = ema(&values, 10);
        assert_approx(*out.last().unwrap(), 50.0, 1e-9);
    }
}
