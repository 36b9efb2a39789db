//! Backtesting engine — replay, online evaluation and run results.

pub mod backtest;
pub mod config;
pub mod result;

pub use backtest::{run_backtest, BacktestEngine, BacktestError};
pub use config::BacktestConfig;
pub use result::{BacktestResult, Decision};
