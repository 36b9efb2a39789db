//! PerpSim CLI — backtest, sweep, one-bar evaluation and goal commands.
//!
//! Commands:
//! - `backtest`: run a backtest from a TOML config (synthetic data by default)
//! - `sweep`: run a stop-loss / take-profit / momentum grid and rank the results
//! - `evaluate`: decision for the last bar of a series, plus the perp rule
//!   when funding rates are given
//! - `goal`: progress summary toward the account goal
//!
//! Logging goes to stderr, filtered by `PERPSIM_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use perpsim_core::goal::{GoalConfig, GoalTracker};
use perpsim_runner::{
    export_json, load_prices, run_on_points, save_artifacts, DataSource, ParamGrid, ParamSweep,
    RunConfig, RunReport, SweepMetric,
};

#[derive(Parser)]
#[command(
    name = "perpsim",
    about = "PerpSim CLI — indicator-driven perpetual futures backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest from a TOML config file.
    Backtest {
        #[command(flatten)]
        source: SourceArgs,

        /// Output directory for report.json, trades.csv and equity.csv.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Sweep stop-loss, take-profit and momentum period over a grid.
    Sweep {
        #[command(flatten)]
        source: SourceArgs,

        /// Stop-loss percentages to try.
        #[arg(long, value_delimiter = ',', default_values_t = [2.0, 5.0, 8.0])]
        stop_loss: Vec<f64>,

        /// Take-profit percentages to try.
        #[arg(long, value_delimiter = ',', default_values_t = [10.0, 15.0, 25.0])]
        take_profit: Vec<f64>,

        /// Momentum periods to try.
        #[arg(long, value_delimiter = ',', default_values_t = [6, 12, 24])]
        momentum: Vec<usize>,

        /// Ranking metric: total_returns, sharpe, profit_factor, win_rate, max_drawdown.
        #[arg(long, default_value = "sharpe")]
        metric: SweepMetric,

        /// Number of ranked runs to print.
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Run grid points one at a time.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Evaluate the last bar of a series.
    Evaluate {
        #[command(flatten)]
        source: SourceArgs,

        /// Account value used for sizing.
        #[arg(long, default_value_t = 10_000.0)]
        account: f64,

        /// Recent funding rates, comma separated. Enables the perp rule.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        funding: Vec<f64>,
    },
    /// Report progress toward the account goal.
    Goal {
        /// Current account value.
        #[arg(long)]
        value: f64,

        /// Days since the account started.
        #[arg(long, default_value_t = 0.0)]
        days: f64,

        /// Recent daily returns as fractions, comma separated.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        returns: Vec<f64>,

        /// Goal value. Defaults to 1,000,000.
        #[arg(long)]
        goal: Option<f64>,

        /// Horizon in days. Defaults to 1825.
        #[arg(long)]
        horizon_days: Option<f64>,

        /// Print progress as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Path to a TOML run config. Without it, defaults run on synthetic data.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the synthetic series length.
    #[arg(long)]
    bars: Option<usize>,

    /// Override the synthetic series seed.
    #[arg(long)]
    seed: Option<u64>,
}

impl SourceArgs {
    fn load_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RunConfig {
                name: "synthetic".into(),
                ..Default::default()
            },
        };

        match &mut config.data {
            DataSource::Synthetic(spec) => {
                if let Some(bars) = self.bars {
                    spec.bars = bars;
                }
                if let Some(seed) = self.seed {
                    spec.seed = seed;
                }
            }
            DataSource::Csv { .. } => {
                if self.bars.is_some() || self.seed.is_some() {
                    bail!("--bars and --seed only apply to synthetic data");
                }
            }
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            source,
            output_dir,
            json,
        } => run_backtest_cmd(&source, output_dir, json),
        Commands::Sweep {
            source,
            stop_loss,
            take_profit,
            momentum,
            metric,
            top,
            sequential,
        } => {
            let grid = ParamGrid {
                stop_loss_percentages: stop_loss,
                take_profit_percentages: take_profit,
                momentum_periods: momentum,
            };
            run_sweep_cmd(&source, &grid, metric, top, sequential)
        }
        Commands::Evaluate {
            source,
            account,
            funding,
        } => run_evaluate_cmd(&source, account, &funding),
        Commands::Goal {
            value,
            days,
            returns,
            goal,
            horizon_days,
            json,
        } => run_goal_cmd(value, days, &returns, goal, horizon_days, json),
    }
}

fn init_tracing() -> Result<()> {
    let filter = std::env::var("PERPSIM_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| anyhow::anyhow!("invalid log filter: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run_backtest_cmd(source: &SourceArgs, output_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let config = source.load_config()?;
    let data = load_prices(&config.data)?;
    let report = run_on_points(&config, &data)?;

    if json {
        println!("{}", export_json(&report)?);
    } else {
        print_summary(&report);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        info!(dir = %run_dir.display(), "artifacts saved");
        if !json {
            println!("Artifacts saved to: {}", run_dir.display());
        }
    }
    Ok(())
}

fn run_sweep_cmd(
    source: &SourceArgs,
    grid: &ParamGrid,
    metric: SweepMetric,
    top: usize,
    sequential: bool,
) -> Result<()> {
    let base = source.load_config()?;
    let data = load_prices(&base.data)?;
    let results = ParamSweep::new()
        .with_parallelism(!sequential)
        .sweep(grid, &base, &data)?;

    if results.is_empty() {
        bail!("grid produced no valid configurations");
    }

    println!("Ran {} of {} grid points, ranked by {metric:?}", results.len(), grid.size());
    println!();
    println!(
        "{:<4} {:>6} {:>6} {:>5} {:>10} {:>8} {:>8} {:>7}",
        "#", "SL%", "TP%", "Mom", "Return%", "Sharpe", "MaxDD%", "Trades"
    );
    println!("{}", "-".repeat(62));
    for (rank, report) in results.ranked(metric).into_iter().take(top).enumerate() {
        let p = &report.config.strategy;
        let r = &report.result;
        println!(
            "{:<4} {:>6.1} {:>6.1} {:>5} {:>10.2} {:>8.3} {:>8.2} {:>7}",
            rank + 1,
            p.stop_loss_percentage,
            p.take_profit_percentage,
            p.momentum_period,
            r.total_returns,
            r.sharpe_ratio,
            r.max_drawdown,
            r.trade_count(),
        );
    }
    Ok(())
}

fn run_evaluate_cmd(source: &SourceArgs, account: f64, funding: &[f64]) -> Result<()> {
    let config = source.load_config()?;
    let data = load_prices(&config.data)?;
    let engine = perpsim_runner::build_engine(&config)?;
    let tracker = GoalTracker::new(config.goal.clone());

    match engine.evaluate_bar(&data.points, account, &tracker)? {
        None => println!("Not enough history: need {} bars", engine.warmup_bars()),
        Some(decision) => {
            println!("Bar {}  close {:.4}", decision.timestamp, decision.price);
            println!(
                "Signal: {:?} (confidence {:.2})",
                decision.signal.action, decision.signal.confidence
            );
            match decision.order {
                Some(order) => println!(
                    "Order:  {:?} size {:.6} @ {:.2}x  stop {:.4}  target {:.4}",
                    order.direction, order.size, order.leverage, order.stop_loss, order.take_profit
                ),
                None => println!("Order:  none"),
            }
        }
    }

    if !funding.is_empty() {
        let perp = engine.evaluate_perp(&data.points, funding)?;
        match perp.direction {
            Some(direction) => println!(
                "Perp:   {direction:?} (confidence {:.2})",
                perp.confidence
            ),
            None => println!("Perp:   hold"),
        }
    }
    Ok(())
}

fn run_goal_cmd(
    value: f64,
    days: f64,
    returns: &[f64],
    goal: Option<f64>,
    horizon_days: Option<f64>,
    json: bool,
) -> Result<()> {
    let defaults = GoalConfig::default();
    let tracker = GoalTracker::new(GoalConfig {
        goal: goal.unwrap_or(defaults.goal),
        horizon_days: horizon_days.unwrap_or(defaults.horizon_days),
    });
    let progress = tracker.progress(value, days, returns);

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        print!("{}", tracker.summary(&progress));
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let r = &report.result;
    println!("=== {} ({}) ===", report.name, &report.run_id[..12]);
    println!(
        "Data:          {} bars{}",
        report.bar_count,
        if report.synthetic { " (synthetic)" } else { "" }
    );
    println!("Predictor:     {}", report.predictor);
    println!("Total return:  {:.2}%", r.total_returns);
    println!("Final capital: ${:.2}", r.final_capital);
    println!("Sharpe:        {:.3}", r.sharpe_ratio);
    println!("Max drawdown:  {:.2}%", r.max_drawdown);
    println!("Win rate:      {:.1}%", r.win_rate);
    println!("Profit factor: {:.2}", r.profit_factor);
    println!("Loss streak:   {}", r.max_consecutive_losses);
    println!("Trades:        {}", r.trade_count());
    if let Some(pos) = &r.open_position {
        println!(
            "Open position: {:?} {:.6} @ {:.4}",
            pos.direction, pos.size, pos.entry_price
        );
    }
    println!();
    print!("{}", GoalTracker::new(report.config.goal.clone()).summary(&report.goal));
}
