//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! middle = SMA(close, period)
//! upper  = middle + multiplier * stddev(close, period)
//! lower  = middle - multiplier * stddev(close, period)
//!
//! Uses population stddev (divide by N). Output length: N - period + 1.

use super::std_dev;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

pub fn bollinger_bands(prices: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    if period == 0 || prices.len() < period {
        return BollingerBands::default();
    }

    let n = prices.len() - period + 1;
    let mut bands = BollingerBands {
        upper: Vec::with_capacity(n),
        middle: Vec::with_capacity(n),
        lower: Vec::with_capacity(n),
    };
    for window in prices.windows(period) {
        let mean = window.iter().sum::<f64>() / period as f64;
        let width = multiplier * std_dev(window);
        bands.middle.push(mean);
        bands.upper.push(mean + width);
        bands.lower.push(mean - width);
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn middle_is_sma() {
        let bands = bollinger_bands(&[10.0, 11.0, 12.0, 13.0, 14.0], 3, 2.0);
        assert_eq!(bands.len(), 3);
        assert_approx(bands.middle[0], 11.0, DEFAULT_EPSILON);
        assert_approx(bands.middle[1], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_symmetric() {
        let bands = bollinger_bands(&[10.0, 12.0, 11.0, 15.0, 14.0], 3, 2.0);
        for i in 0..bands.len() {
            let up = bands.upper[i] - bands.middle[i];
            let down = bands.middle[i] - bands.lower[i];
            assert_approx(up, down, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn known_width() {
        // window (2, 4, 6, 8): mean 5, population stddev sqrt(5)
        let bands = bollinger_bands(&[2.0, 4.0, 6.0, 8.0], 4, 2.0);
        assert_approx(bands.upper[0], 5.0 + 2.0 * 5.0_f64.sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn constant_price_zero_width() {
        let bands = bollinger_bands(&[100.0; 25], 20, 2.0);
        assert_approx(bands.upper[0], 100.0, DEFAULT_EPSILON);
        assert_approx(bands.lower[5], 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn short_series_is_empty() {
        assert!(bollinger_bands(&[1.0; 19], 20, 2.0).is_empty());
    }
}
