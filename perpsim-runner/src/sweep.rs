//! Parameter sweep over strategy parameters.
//!
//! Each grid point is an independent run over the same pre-loaded series, so
//! runs fan out across a rayon pool.

use std::collections::HashMap;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::{debug, info};

use perpsim_core::engine::BacktestResult;

use crate::config::{RunConfig, RunId};
use crate::data_loader::LoadedData;
use crate::runner::{run_on_points, RunError, RunReport};

/// Strategy parameter values to cross.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    pub stop_loss_percentages: Vec<f64>,
    pub take_profit_percentages: Vec<f64>,
    pub momentum_periods: Vec<usize>,
}

impl Default for ParamGrid {
    /// Stop-loss 2/5/8%, take-profit 10/15/25%, momentum 6/12/24.
    fn default() -> Self {
        Self {
            stop_loss_percentages: vec![2.0, 5.0, 8.0],
            take_profit_percentages: vec![10.0, 15.0, 25.0],
            momentum_periods: vec![6, 12, 24],
        }
    }
}

impl ParamGrid {
    /// Upper bound on the number of configurations (before skipping).
    pub fn size(&self) -> usize {
        self.stop_loss_percentages.len()
            * self.take_profit_percentages.len()
            * self.momentum_periods.len()
    }

    /// All grid points applied to `base`. Points whose take-profit does not
    /// exceed the stop-loss, or that fail validation, are skipped.
    pub fn generate_configs(&self, base: &RunConfig) -> Vec<RunConfig> {
        let mut configs = Vec::new();
        for &sl in &self.stop_loss_percentages {
            for &tp in &self.take_profit_percentages {
                if tp <= sl {
                    continue;
                }
                for &momentum in &self.momentum_periods {
                    let mut config = base.clone();
                    config.strategy.stop_loss_percentage = sl;
                    config.strategy.take_profit_percentage = tp;
                    config.strategy.momentum_period = momentum;
                    if config.strategy.validate().is_err() {
                        debug!(sl, tp, momentum, "skipping invalid grid point");
                        continue;
                    }
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// Ranking criterion. Higher scores rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepMetric {
    TotalReturns,
    SharpeRatio,
    ProfitFactor,
    WinRate,
    /// Ranked by smallest drawdown.
    MaxDrawdown,
}

impl SweepMetric {
    pub fn score(self, result: &BacktestResult) -> f64 {
        match self {
            Self::TotalReturns => result.total_returns,
            Self::SharpeRatio => result.sharpe_ratio,
            Self::ProfitFactor => result.profit_factor,
            Self::WinRate => result.win_rate,
            Self::MaxDrawdown => -result.max_drawdown,
        }
    }
}

impl FromStr for SweepMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total_returns" | "returns" => Ok(Self::TotalReturns),
            "sharpe" | "sharpe_ratio" => Ok(Self::SharpeRatio),
            "profit_factor" => Ok(Self::ProfitFactor),
            "win_rate" => Ok(Self::WinRate),
            "max_drawdown" | "drawdown" => Ok(Self::MaxDrawdown),
            other => Err(format!(
                "unknown metric '{other}' (expected total_returns, sharpe, profit_factor, win_rate or max_drawdown)"
            )),
        }
    }
}

/// Parameter sweep executor.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every grid point against `data`. The first failing run aborts the
    /// sweep.
    pub fn sweep(
        &self,
        grid: &ParamGrid,
        base: &RunConfig,
        data: &LoadedData,
    ) -> Result<SweepResults, RunError> {
        let configs = grid.generate_configs(base);
        info!(configs = configs.len(), parallel = self.parallel, "starting sweep");

        let reports: Vec<RunReport> = if self.parallel {
            configs
                .par_iter()
                .map(|config| run_on_points(config, data))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .map(|config| run_on_points(config, data))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(reports))
    }
}

/// Results from a parameter sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    reports: Vec<RunReport>,
    by_run_id: HashMap<RunId, usize>,
}

impl SweepResults {
    fn new(reports: Vec<RunReport>) -> Self {
        let by_run_id = reports
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { reports, by_run_id }
    }

    pub fn all(&self) -> &[RunReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&RunReport> {
        self.by_run_id.get(run_id).map(|&i| &self.reports[i])
    }

    /// Reports ordered best-first by `metric`. Ties keep grid order.
    pub fn ranked(&self, metric: SweepMetric) -> Vec<&RunReport> {
        let mut ranked: Vec<&RunReport> = self.reports.iter().collect();
        ranked.sort_by(|a, b| metric.score(&b.result).total_cmp(&metric.score(&a.result)));
        ranked
    }

    pub fn best_by(&self, metric: SweepMetric) -> Option<&RunReport> {
        self.ranked(metric).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_skips_inverted_brackets() {
        let grid = ParamGrid {
            stop_loss_percentages: vec![5.0, 20.0],
            take_profit_percentages: vec![10.0],
            momentum_periods: vec![12],
        };
        let configs = grid.generate_configs(&RunConfig::default());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].strategy.stop_loss_percentage, 5.0);
        assert_eq!(ParamGrid::default().size(), 27);
    }

    #[test]
    fn invalid_points_are_skipped() {
        let grid = ParamGrid {
            stop_loss_percentages: vec![5.0],
            take_profit_percentages: vec![15.0],
            momentum_periods: vec![0, 12],
        };
        let configs = grid.generate_configs(&RunConfig::default());
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].strategy.momentum_period, 12);
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("sharpe".parse::<SweepMetric>(), Ok(SweepMetric::SharpeRatio));
        assert_eq!("drawdown".parse::<SweepMetric>(), Ok(SweepMetric::MaxDrawdown));
        assert!("alpha".parse::<SweepMetric>().is_err());
    }
}
