//! Backtest runner — wires together config, data loading and the engine.
//!
//! Two entry points:
//! - `run_config()`: loads data from the config's source, then runs. Used by the CLI.
//! - `run_on_points()`: takes a pre-loaded series. Used by sweeps so data is
//!   read once.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use perpsim_core::domain::PricePoint;
use perpsim_core::engine::{BacktestEngine, BacktestError, BacktestResult};
use perpsim_core::goal::{GoalProgress, GoalTracker};
use perpsim_core::metrics::per_bar_returns;

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{load_prices, LoadError, LoadedData};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Load(#[from] LoadError),
    #[error("backtest error: {0}")]
    Backtest(#[from] BacktestError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Equity points fed to the goal tracker as recent returns.
const GOAL_RETURN_WINDOW: usize = 30;

const DAY_MS: f64 = 86_400_000.0;

/// Complete, persisted outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub name: String,
    pub config: RunConfig,
    pub dataset_hash: String,
    pub synthetic: bool,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub predictor: String,
    pub first_timestamp: i64,
    pub last_timestamp: i64,
    pub result: BacktestResult,
    pub goal: GoalProgress,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Build the engine a config describes.
pub fn build_engine(config: &RunConfig) -> Result<BacktestEngine, RunError> {
    let engine = BacktestEngine::new(config.strategy.clone(), config.backtest.clone())?
        .with_indicator_settings(config.indicators.clone())?
        .with_signal_config(config.signals.clone())?
        .with_predictor(config.predictor.build()?);
    Ok(engine)
}

/// Load the configured data and run.
pub fn run_config(config: &RunConfig) -> Result<RunReport, RunError> {
    let data = load_prices(&config.data)?;
    run_on_points(config, &data)
}

/// Run against an already-loaded series, with no I/O.
pub fn run_on_points(config: &RunConfig, data: &LoadedData) -> Result<RunReport, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;
    let engine = build_engine(config)?;
    let tracker = GoalTracker::new(config.goal.clone());
    let result = engine.run(&data.points, &tracker)?;

    let goal = goal_progress(&tracker, &data.points, &result);
    info!(
        run_id = %&run_id[..12],
        trades = result.trades.len(),
        final_capital = result.final_capital,
        "run complete"
    );

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        name: config.name.clone(),
        config: config.clone(),
        dataset_hash: data.dataset_hash.clone(),
        synthetic: data.synthetic,
        bar_count: data.points.len(),
        warmup_bars: engine.warmup_bars(),
        predictor: engine.predictor_name().to_string(),
        first_timestamp: data.points.first().map_or(0, |p| p.timestamp),
        last_timestamp: data.points.last().map_or(0, |p| p.timestamp),
        result,
        goal,
    })
}

/// Goal progress at the end of a run. Elapsed days come from the series'
/// timestamps; recent returns from the tail of the equity curve.
fn goal_progress(tracker: &GoalTracker, points: &[PricePoint], result: &BacktestResult) -> GoalProgress {
    let days_elapsed = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp) as f64 / DAY_MS,
        _ => 0.0,
    };
    let tail_start = result.equity.len().saturating_sub(GOAL_RETURN_WINDOW + 1);
    let recent = per_bar_returns(&result.equity[tail_start..]);
    tracker.progress(result.final_capital, days_elapsed, &recent)
}
