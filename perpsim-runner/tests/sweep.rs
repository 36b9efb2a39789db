//! Parameter sweep integration tests.

use perpsim_runner::{
    load_prices, run_on_points, DataSource, ParamGrid, ParamSweep, RunConfig, SweepMetric,
    SyntheticSpec,
};

fn data() -> perpsim_runner::LoadedData {
    load_prices(&DataSource::Synthetic(SyntheticSpec {
        bars: 250,
        volatility: 0.04,
        ..Default::default()
    }))
    .unwrap()
}

fn small_grid() -> ParamGrid {
    ParamGrid {
        stop_loss_percentages: vec![3.0, 6.0],
        take_profit_percentages: vec![12.0, 20.0],
        momentum_periods: vec![8, 16],
    }
}

#[test]
fn parallel_and_sequential_sweeps_agree() {
    let data = data();
    let base = RunConfig::default();
    let grid = small_grid();

    let par = ParamSweep::new().sweep(&grid, &base, &data).unwrap();
    let seq = ParamSweep::new()
        .with_parallelism(false)
        .sweep(&grid, &base, &data)
        .unwrap();

    assert_eq!(par.len(), grid.size());
    assert_eq!(par.all(), seq.all());
}

#[test]
fn sweep_points_match_single_runs() {
    let data = data();
    let base = RunConfig::default();
    let grid = small_grid();
    let results = ParamSweep::new().sweep(&grid, &base, &data).unwrap();

    for config in grid.generate_configs(&base) {
        let single = run_on_points(&config, &data).unwrap();
        let swept = results.get(&single.run_id).expect("grid point missing");
        assert_eq!(swept, &single);
    }
}

#[test]
fn ranking_is_best_first() {
    let data = data();
    let results = ParamSweep::new()
        .sweep(&small_grid(), &RunConfig::default(), &data)
        .unwrap();

    let ranked = results.ranked(SweepMetric::TotalReturns);
    for pair in ranked.windows(2) {
        assert!(pair[0].result.total_returns >= pair[1].result.total_returns);
    }
    let best = results.best_by(SweepMetric::MaxDrawdown).unwrap();
    assert!(results
        .all()
        .iter()
        .all(|r| best.result.max_drawdown <= r.result.max_drawdown));
}

#[test]
fn empty_grid_gives_empty_results() {
    let grid = ParamGrid {
        stop_loss_percentages: vec![],
        ..small_grid()
    };
    let results = ParamSweep::new()
        .sweep(&grid, &RunConfig::default(), &data())
        .unwrap();
    assert!(results.is_empty());
    assert!(results.best_by(SweepMetric::SharpeRatio).is_none());
}
