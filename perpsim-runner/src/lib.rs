//! PerpSim Runner — config files, data loading, run orchestration, sweeps
//! and artifact export.
//!
//! This crate builds on `perpsim-core` to provide:
//! - TOML run configs with content-addressed run ids
//! - CSV price loading and seeded synthetic series
//! - Single runs producing a persisted `RunReport`
//! - Parallel parameter sweeps with metric ranking
//! - JSON/CSV artifact export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;
pub mod synthetic;

pub use config::{ConfigError, DataSource, PredictorConfig, RunConfig, RunId};
pub use data_loader::{load_csv, load_prices, LoadError, LoadedData};
pub use export::{export_equity_csv, export_json, export_trades_csv, import_json, save_artifacts};
pub use runner::{build_engine, run_config, run_on_points, RunError, RunReport, SCHEMA_VERSION};
pub use sweep::{ParamGrid, ParamSweep, SweepMetric, SweepResults};
pub use synthetic::{generate, generate_funding_rates, SyntheticSpec};
