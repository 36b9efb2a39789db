//! Bar-by-bar replay of signals, sizing and fills.
//!
//! Per replayed bar, in order:
//! 1. Bracket check: an open position whose stop-loss or take-profit level
//!    the bar traded through is closed at that level, or at the open when
//!    the bar gapped past it.
//! 2. Signal: the canonical rule set evaluates the bar.
//! 3. Reversal: an open position facing an opposite signal is closed.
//! 4. Entry: when flat and the signal is Buy/Sell, a sized position opens.
//! 5. Accounting: realized capital is appended to the equity curve.
//!
//! Replay starts on the first bar where every indicator is defined. Capital
//! moves only on realized events: the entry commission, and the PnL minus
//! exit commission when a position closes.

use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use crate::domain::{
    closes, validate_series, DataError, Direction, ExitReason, Position, PricePoint, Signal, Trade,
};
use crate::goal::GoalTracker;
use crate::indicators::{IndicatorEngine, IndicatorSettings, IndicatorSnapshot};
use crate::params::{ConfigError, StrategyParameters};
use crate::signals::{
    average_funding_rate, resolve_perp_direction, BarContext, LinearTrendPredictor, PerpDecision,
    PricePredictor, SignalConfig, SignalGenerator,
};
use crate::sizers::{PositionSizer, SizedOrder, SizingRequest};

use super::config::BacktestConfig;
use super::result::{BacktestResult, Decision, RunOutput};

#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid price series: {0}")]
    Data(#[from] DataError),
}

pub struct BacktestEngine {
    config: BacktestConfig,
    sizer: PositionSizer,
    indicators: IndicatorEngine,
    signals: SignalGenerator,
    predictor: Box<dyn PricePredictor>,
}

impl BacktestEngine {
    /// Build an engine with default indicator periods, the default rule
    /// thresholds and a linear trend predictor.
    pub fn new(params: StrategyParameters, config: BacktestConfig) -> Result<Self, BacktestError> {
        config.validate()?;
        let sizer = PositionSizer::new(params)?;
        let settings = IndicatorSettings {
            momentum_period: sizer.params().momentum_period,
            ..Default::default()
        };
        let signals = SignalGenerator::new(SignalConfig {
            require_volume_confirmation: config.require_volume_confirmation,
            ..Default::default()
        });
        Ok(Self {
            config,
            sizer,
            indicators: IndicatorEngine::new(settings),
            signals,
            predictor: Box::new(LinearTrendPredictor::default()),
        })
    }

    /// Replace indicator periods. The momentum period always follows the
    /// strategy parameters.
    pub fn with_indicator_settings(
        mut self,
        mut settings: IndicatorSettings,
    ) -> Result<Self, BacktestError> {
        settings.momentum_period = self.sizer.params().momentum_period;
        settings.validate()?;
        self.indicators = IndicatorEngine::new(settings);
        Ok(self)
    }

    /// Replace rule thresholds. Volume confirmation stays on when either the
    /// signal config or the backtest config asks for it.
    pub fn with_signal_config(mut self, mut signal_config: SignalConfig) -> Result<Self, BacktestError> {
        signal_config.validate()?;
        signal_config.require_volume_confirmation |= self.config.require_volume_confirmation;
        self.signals = SignalGenerator::new(signal_config);
        Ok(self)
    }

    pub fn with_predictor(mut self, predictor: Box<dyn PricePredictor>) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn params(&self) -> &StrategyParameters {
        self.sizer.params()
    }

    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    pub fn warmup_bars(&self) -> usize {
        self.indicators.warmup_bars()
    }

    /// Replay `points` and aggregate the run statistics.
    ///
    /// A series shorter than the warmup replays no bars and returns a flat
    /// result.
    pub fn run(
        &self,
        points: &[PricePoint],
        goal: &GoalTracker,
    ) -> Result<BacktestResult, BacktestError> {
        validate_series(points)?;
        let _span = info_span!("backtest", bars = points.len(), predictor = self.predictor.name())
            .entered();

        let snapshots = self.indicators.snapshots(points);
        let prices = closes(points);
        let start = self.warmup_bars().saturating_sub(1);

        let initial = self.config.initial_capital;
        let mut capital = initial;
        let mut position: Option<Position> = None;
        let mut out = RunOutput {
            equity: vec![initial],
            ..Default::default()
        };

        for i in start..points.len() {
            let bar = &points[i];

            if self.config.use_brackets {
                let hit = position.as_ref().and_then(|pos| pos.bracket_hit(bar));
                if let Some((fill, reason)) = hit {
                    if let Some(pos) = position.take() {
                        debug!(bar = i, fill, ?reason, "bracket hit");
                        out.trades.push(self.close(pos, fill, bar.timestamp, reason, &mut capital));
                    }
                }
            }

            let signal = self.signal_at(i, points, &prices, &snapshots);

            if position.as_ref().is_some_and(|pos| signal.reverses(pos.direction)) {
                if let Some(pos) = position.take() {
                    out.trades.push(self.close(
                        pos,
                        bar.close,
                        bar.timestamp,
                        ExitReason::Reversal,
                        &mut capital,
                    ));
                }
            }

            if position.is_none() {
                if let Some(direction) = signal.action.direction() {
                    position = self.open(direction, &signal, bar, &snapshots[i], goal, &mut capital);
                }
            }

            out.equity.push(capital);
            out.bars_processed += 1;
        }

        if let Some(pos) = position.take() {
            if self.config.close_open_positions_at_end {
                if let Some(last) = points.last() {
                    let trade =
                        self.close(pos, last.close, last.timestamp, ExitReason::EndOfData, &mut capital);
                    out.trades.push(trade);
                    if let Some(eq) = out.equity.last_mut() {
                        *eq = capital;
                    }
                }
            } else {
                out.open_position = Some(pos);
            }
        }

        let result = BacktestResult::from_run(
            initial,
            self.config.risk_free_rate,
            self.config.periods_per_year,
            out,
        );
        info!(
            trades = result.trades.len(),
            total_returns = result.total_returns,
            max_drawdown = result.max_drawdown,
            "backtest complete"
        );
        Ok(result)
    }

    /// Decide on the last bar of `history`. Host-driven: one call per tick.
    ///
    /// Returns `None` for an empty history. Before the warmup is satisfied
    /// the decision is always Hold.
    pub fn evaluate_bar(
        &self,
        history: &[PricePoint],
        account_value: f64,
        goal: &GoalTracker,
    ) -> Result<Option<Decision>, BacktestError> {
        validate_series(history)?;
        let Some(last) = history.last() else {
            return Ok(None);
        };
        let i = history.len() - 1;
        let snapshots = self.indicators.snapshots(history);
        let snapshot = snapshots[i];

        let signal = if history.len() < self.warmup_bars() {
            Signal::hold()
        } else {
            self.signal_at(i, history, &closes(history), &snapshots)
        };

        let order = signal.action.direction().and_then(|direction| {
            let fill = self.entry_fill(direction, last.close);
            self.sizer.size(&SizingRequest {
                direction,
                confidence: signal.confidence,
                account_value,
                entry_price: fill,
                volatility: snapshot.volatility.unwrap_or(0.0),
                momentum: snapshot.momentum.unwrap_or(0.0),
                risk_adjustment: goal.risk_adjustment(account_value),
            })
        });

        Ok(Some(Decision {
            timestamp: last.timestamp,
            price: last.close,
            signal,
            order,
            snapshot,
        }))
    }

    /// Perp direction for the last bar of `history` from the average of
    /// `funding_rates` and the bar's momentum and volatility.
    pub fn evaluate_perp(
        &self,
        history: &[PricePoint],
        funding_rates: &[f64],
    ) -> Result<PerpDecision, BacktestError> {
        validate_series(history)?;
        let snapshot = self.indicators.latest(history).unwrap_or_default();
        Ok(resolve_perp_direction(
            self.sizer.params(),
            average_funding_rate(funding_rates),
            snapshot.momentum.unwrap_or(0.0),
            snapshot.volatility.unwrap_or(0.0),
        ))
    }

    fn signal_at(
        &self,
        i: usize,
        points: &[PricePoint],
        prices: &[f64],
        snapshots: &[IndicatorSnapshot],
    ) -> Signal {
        let ctx = BarContext {
            current: &snapshots[i],
            previous: i.checked_sub(1).map(|p| &snapshots[p]),
            price: prices[i],
            volume: points[i].volume,
            predicted_price: self.predictor.predict(&prices[..=i]),
        };
        self.signals.evaluate(&ctx)
    }

    /// Buying pays up, selling receives less.
    fn entry_fill(&self, direction: Direction, price: f64) -> f64 {
        price * (1.0 + direction.sign() * self.config.slippage_rate)
    }

    fn exit_fill(&self, direction: Direction, price: f64) -> f64 {
        price * (1.0 - direction.sign() * self.config.slippage_rate)
    }

    fn open(
        &self,
        direction: Direction,
        signal: &Signal,
        bar: &PricePoint,
        snapshot: &IndicatorSnapshot,
        goal: &GoalTracker,
        capital: &mut f64,
    ) -> Option<Position> {
        let fill = self.entry_fill(direction, bar.close);
        let request = SizingRequest {
            direction,
            confidence: signal.confidence,
            account_value: *capital,
            entry_price: fill,
            volatility: snapshot.volatility.unwrap_or(0.0),
            momentum: snapshot.momentum.unwrap_or(0.0),
            risk_adjustment: goal.risk_adjustment(*capital),
        };
        let Some(SizedOrder {
            size,
            leverage,
            notional,
            stop_loss,
            take_profit,
            ..
        }) = self.sizer.size(&request)
        else {
            warn!(
                timestamp = bar.timestamp,
                ?direction,
                capital = *capital,
                "order below minimum size, skipped"
            );
            return None;
        };

        let commission = notional * self.config.commission_rate;
        *capital -= commission;
        debug!(timestamp = bar.timestamp, ?direction, fill, size, leverage, commission, "open");
        Some(Position {
            direction,
            entry_price: fill,
            size,
            leverage,
            entry_time: bar.timestamp,
            stop_loss,
            take_profit,
            entry_commission: commission,
        })
    }

    fn close(
        &self,
        pos: Position,
        price: f64,
        timestamp: i64,
        reason: ExitReason,
        capital: &mut f64,
    ) -> Trade {
        let exit_price = self.exit_fill(pos.direction, price);
        let exit_commission = exit_price * pos.size * self.config.commission_rate;
        let pnl = pos.unrealized_pnl(exit_price);
        *capital += pnl - exit_commission;

        let commission = pos.entry_commission + exit_commission;
        let profit = pnl - commission;
        let notional = pos.notional();
        let profit_percent = if notional > 0.0 { profit / notional * 100.0 } else { 0.0 };
        debug!(timestamp, ?reason, exit_price, profit, "close");

        Trade {
            direction: pos.direction,
            entry_date: pos.entry_time,
            exit_date: timestamp,
            entry_price: pos.entry_price,
            exit_price,
            size: pos.size,
            commission,
            profit,
            profit_percent,
            exit_reason: reason,
        }
    }
}

/// Replay with default strategy parameters and a fresh goal tracker.
pub fn run_backtest(
    points: &[PricePoint],
    initial_capital: f64,
    commission_rate: f64,
    slippage_rate: f64,
) -> Result<BacktestResult, BacktestError> {
    let config = BacktestConfig::new(initial_capital, commission_rate, slippage_rate);
    BacktestEngine::new(StrategyParameters::default(), config)?.run(points, &GoalTracker::default())
}
