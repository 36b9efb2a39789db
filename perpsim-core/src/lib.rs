//! PerpSim Core — indicators, signals, sizing, goal tracking and the
//! backtest replay loop.
//!
//! Everything in this crate is pure, synchronous computation over an
//! in-memory price series:
//! - Domain types (price points, signals, positions, trades)
//! - Technical indicators and the per-bar `IndicatorEngine`
//! - Canonical signal rules plus the perp funding/momentum rule
//! - Risk-budget position sizing with goal-based throttling
//! - `BacktestEngine` for offline replay and one-bar online decisions

pub mod domain;
pub mod engine;
pub mod goal;
pub mod indicators;
pub mod metrics;
pub mod params;
pub mod signals;
pub mod sizers;

pub use domain::{Action, Direction, PricePoint, Signal, Trade};
pub use engine::{run_backtest, BacktestConfig, BacktestEngine, BacktestError, BacktestResult};
pub use goal::{GoalConfig, GoalProgress, GoalTracker, Milestone};
pub use params::{ConfigError, StrategyParameters};
