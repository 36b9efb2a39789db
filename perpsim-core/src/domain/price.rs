//! PricePoint — the fundamental market data unit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV record for one bar of a single market.
///
/// `timestamp` is unix milliseconds. The series handed to the engine must be
/// strictly increasing in time; see [`validate_series`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if every OHLCV field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Problems with an input price series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("timestamp at index {index} ({timestamp}) is not after the previous bar ({previous})")]
    NonIncreasingTimestamp {
        index: usize,
        timestamp: i64,
        previous: i64,
    },
    #[error("non-finite or non-positive price at index {index}")]
    NonFinitePrice { index: usize },
}

/// Check the ordering and sanity invariants of a price series.
pub fn validate_series(points: &[PricePoint]) -> Result<(), DataError> {
    for (index, point) in points.iter().enumerate() {
        if !point.is_finite() || point.close <= 0.0 {
            return Err(DataError::NonFinitePrice { index });
        }
        if index > 0 {
            let previous = points[index - 1].timestamp;
            if point.timestamp <= previous {
                return Err(DataError::NonIncreasingTimestamp {
                    index,
                    timestamp: point.timestamp,
                    previous,
                });
            }
        }
    }
    Ok(())
}

/// Extract the close column.
pub fn closes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}

/// Extract the volume column.
pub fn volumes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.volume).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: i64, close: f64) -> PricePoint {
        PricePoint::new(timestamp, close, close + 1.0, close - 1.0, close, 1_000.0)
    }

    #[test]
    fn valid_series_passes() {
        let points = vec![point(1, 100.0), point(2, 101.0), point(3, 99.5)];
        assert!(validate_series(&points).is_ok());
    }

    #[test]
    fn empty_series_is_valid() {
        assert!(validate_series(&[]).is_ok());
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let points = vec![point(1, 100.0), point(1, 101.0)];
        assert_eq!(
            validate_series(&points),
            Err(DataError::NonIncreasingTimestamp {
                index: 1,
                timestamp: 1,
                previous: 1
            })
        );
    }

    #[test]
    fn nan_close_rejected() {
        let points = vec![point(1, 100.0), point(2, f64::NAN)];
        assert_eq!(
            validate_series(&points),
            Err(DataError::NonFinitePrice { index: 1 })
        );
    }

    #[test]
    fn zero_close_rejected() {
        let points = vec![point(1, 0.0)];
        assert!(validate_series(&points).is_err());
    }
}
