//! Property tests for indicator, metric and engine invariants.
//!
//! Uses proptest to verify:
//! 1. RSI stays within [0, 100]
//! 2. EMA of a constant series is that constant
//! 3. MACD histogram equals line minus signal at every aligned index
//! 4. Win rate stays within [0, 100] and profit factor is finite
//! 5. Backtests are deterministic
//! 6. Goal projection shrinks as the account approaches the goal

use proptest::prelude::*;
use perpsim_core::domain::{Direction, ExitReason, PricePoint, Trade};
use perpsim_core::engine::{BacktestConfig, BacktestEngine};
use perpsim_core::goal::GoalTracker;
use perpsim_core::indicators::{ema, macd, rsi, MacdParams};
use perpsim_core::metrics::{profit_factor, win_rate_pct};
use perpsim_core::StrategyParameters;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_prices(min_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..1_000.0_f64, min_len..200)
}

/// Random walk with bounded per-bar moves, kept strictly positive.
fn arb_walk() -> impl Strategy<Value = Vec<f64>> {
    (50.0..200.0_f64, prop::collection::vec(-0.05..0.05_f64, 40..150)).prop_map(|(start, steps)| {
        let mut price = start;
        let mut out = Vec::with_capacity(steps.len());
        for r in steps {
            price = (price * (1.0 + r)).max(1.0);
            out.push(price);
        }
        out
    })
}

fn arb_trade() -> impl Strategy<Value = Trade> {
    (-500.0..500.0_f64).prop_map(|profit| Trade {
        direction: Direction::Long,
        entry_date: 0,
        exit_date: 1,
        entry_price: 100.0,
        exit_price: 100.0,
        size: 1.0,
        commission: 0.0,
        profit,
        profit_percent: profit,
        exit_reason: ExitReason::Reversal,
    })
}

fn to_points(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(i as i64 * 60_000, c, c * 1.01, c * 0.99, c, 1_000.0 + i as f64))
        .collect()
}

// ── 1–3. Indicators ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_is_bounded(prices in arb_prices(2), period in 1usize..30) {
        for v in rsi(&prices, period) {
            prop_assert!((0.0..=100.0).contains(&v), "rsi {v} out of range");
        }
    }

    #[test]
    fn ema_of_constant_is_constant(c in 0.5..5_000.0_f64, n in 1usize..120, period in 1usize..40) {
        for v in ema(&vec![c; n], period) {
            prop_assert!((v - c).abs() <= c * 1e-12, "ema {v} drifted from {c}");
        }
    }

    #[test]
    fn macd_histogram_identity(prices in arb_prices(40)) {
        let out = macd(&prices, MacdParams::default());
        prop_assert_eq!(out.signal.len(), out.histogram.len());
        for ((m, s), h) in out.aligned_macd_line().iter().zip(&out.signal).zip(&out.histogram) {
            prop_assert!((h - (m - s)).abs() < 1e-9);
        }
    }
}

// ── 4. Trade statistics ──────────────────────────────────────────────

proptest! {
    #[test]
    fn trade_stats_are_finite(trades in prop::collection::vec(arb_trade(), 0..50)) {
        let wr = win_rate_pct(&trades);
        prop_assert!((0.0..=100.0).contains(&wr));
        let pf = profit_factor(&trades);
        prop_assert!(pf.is_finite() && pf >= 0.0);
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn backtest_is_deterministic(closes in arb_walk(), commission in 0.0..0.01_f64, slippage in 0.0..0.01_f64) {
        let points = to_points(&closes);
        let config = BacktestConfig::new(10_000.0, commission, slippage);
        let engine = BacktestEngine::new(StrategyParameters::default(), config).unwrap();
        let goal = GoalTracker::default();
        let first = engine.run(&points, &goal).unwrap();
        let second = engine.run(&points, &goal).unwrap();
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(first.equity.len(), first.drawdown.len());
        prop_assert!(first.sharpe_ratio.is_finite());
        prop_assert!(first.max_drawdown >= 0.0 && first.max_drawdown <= 100.0);
    }

    #[test]
    fn closed_trades_reconcile_with_capital(closes in arb_walk()) {
        let points = to_points(&closes);
        let config = BacktestConfig {
            close_open_positions_at_end: true,
            ..Default::default()
        };
        let engine = BacktestEngine::new(StrategyParameters::default(), config).unwrap();
        let result = engine.run(&points, &GoalTracker::default()).unwrap();
        let realized: f64 = result.trades.iter().map(|t| t.profit).sum();
        prop_assert!((result.final_capital - 10_000.0 - realized).abs() < 1e-6);
        prop_assert!(result.open_position.is_none());
    }
}

// ── 6. Goal projection ───────────────────────────────────────────────

proptest! {
    #[test]
    fn projection_monotone_in_value(
        low in 1_000.0..400_000.0_f64,
        gap in 1.0..500_000.0_f64,
        annual in 0.01..3.0_f64,
    ) {
        let t = GoalTracker::default();
        let high = low + gap;
        prop_assert!(t.projected_days_to_goal(high, annual) < t.projected_days_to_goal(low, annual));
    }
}
