//! Property-based tests for data loading and export helpers.

use perpsim_core::domain::validate_series;
use perpsim_runner::data_loader::{dataset_hash, parse_timestamp, read_csv};
use perpsim_runner::export::format_timestamp;
use perpsim_runner::{generate, SyntheticSpec};
use proptest::prelude::*;

proptest! {
    #[test]
    fn synthetic_series_is_always_valid(
        bars in 1usize..300,
        start_price in 0.5f64..10_000.0,
        volatility in 0.0f64..0.2,
        seed in any::<u64>(),
    ) {
        let points = generate(&SyntheticSpec {
            bars,
            start_price,
            volatility,
            seed,
            ..Default::default()
        });
        prop_assert_eq!(points.len(), bars);
        prop_assert!(validate_series(&points).is_ok());
        for p in &points {
            prop_assert!(p.low <= p.open.min(p.close));
            prop_assert!(p.high >= p.open.max(p.close));
        }
    }

    #[test]
    fn rfc3339_timestamps_round_trip(secs in 0i64..4_000_000_000) {
        let ms = secs * 1_000;
        prop_assert_eq!(parse_timestamp(&format_timestamp(ms)), Some(ms));
    }

    #[test]
    fn csv_reload_preserves_hash(seed in any::<u64>(), bars in 1usize..50) {
        let points = generate(&SyntheticSpec { bars, seed, ..Default::default() });
        let mut body = String::from("timestamp,open,high,low,close,volume\n");
        for p in &points {
            body.push_str(&format!(
                "{},{},{},{},{},{}\n",
                p.timestamp, p.open, p.high, p.low, p.close, p.volume
            ));
        }
        let reloaded = read_csv(body.as_bytes()).unwrap();
        prop_assert_eq!(dataset_hash(&reloaded), dataset_hash(&points));
    }
}
