//! Indicator precomputation.
//!
//! All indicators are computed once over the full series before the bar loop
//! and stored as one `IndicatorSnapshot` per bar. Every indicator used here is
//! causal, so the snapshot for bar t is identical whether it was computed from
//! `points[..=t]` or from the whole series.

use serde::{Deserialize, Serialize};

use super::{
    align, bollinger_bands, ema, macd, momentum, rolling_volatility, rsi, sma, MacdParams,
};
use crate::domain::{closes, volumes, PricePoint};
use crate::params::ConfigError;

/// Periods for every indicator in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub macd: MacdParams,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub volatility_window: usize,
    pub momentum_period: usize,
    pub volume_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd: MacdParams::default(),
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            volatility_window: 20,
            momentum_period: 12,
            volume_period: 20,
        }
    }
}

impl IndicatorSettings {
    /// Every period must be at least 1 and the MACD fast period must sit
    /// below the slow one. A zero period would leave its snapshot field
    /// `None` for the whole run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("macd.fast", self.macd.fast),
            ("macd.slow", self.macd.slow),
            ("macd.signal", self.macd.signal),
            ("bollinger_period", self.bollinger_period),
            ("volatility_window", self.volatility_window),
            ("momentum_period", self.momentum_period),
            ("volume_period", self.volume_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ConfigError::ZeroPeriod { name });
        }
        if self.macd.fast >= self.macd.slow {
            return Err(ConfigError::MacdFastNotBelowSlow {
                fast: self.macd.fast,
                slow: self.macd.slow,
            });
        }
        if !(self.bollinger_multiplier > 0.0) || !self.bollinger_multiplier.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "bollinger_multiplier",
                value: self.bollinger_multiplier,
            });
        }
        Ok(())
    }
}

/// Indicator values for one bar. `None` until enough history exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub ema_short: Option<f64>,
    pub ema_long: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub volatility: Option<f64>,
    pub momentum: Option<f64>,
    pub volume_sma: Option<f64>,
}

impl IndicatorSnapshot {
    /// True once every field has a value.
    pub fn is_complete(&self) -> bool {
        [
            self.rsi,
            self.macd_line,
            self.macd_signal,
            self.macd_histogram,
            self.ema_short,
            self.ema_long,
            self.bollinger_upper,
            self.bollinger_middle,
            self.bollinger_lower,
            self.volatility,
            self.momentum,
            self.volume_sma,
        ]
        .iter()
        .all(Option::is_some)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    settings: IndicatorSettings,
}

impl IndicatorEngine {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    /// Number of bars needed before every snapshot field is defined.
    pub fn warmup_bars(&self) -> usize {
        let s = &self.settings;
        [
            s.rsi_period + 1,
            s.macd.warmup_bars(),
            s.bollinger_period,
            s.volatility_window + 1,
            s.momentum_period + 1,
            s.volume_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// One snapshot per input bar.
    pub fn snapshots(&self, points: &[PricePoint]) -> Vec<IndicatorSnapshot> {
        let n = points.len();
        let s = &self.settings;
        let prices = closes(points);

        let rsi = align(&rsi(&prices, s.rsi_period), n);

        let macd = macd(&prices, s.macd);
        let macd_ready = prices.len() >= s.macd.warmup_bars();
        let (macd_line, macd_signal, macd_histogram) = if macd_ready {
            (
                align(&macd.macd_line, n),
                align(&macd.signal, n),
                align(&macd.histogram, n),
            )
        } else {
            (vec![None; n], vec![None; n], vec![None; n])
        };

        let ema_short = strict_ema(&prices, s.macd.fast);
        let ema_long = strict_ema(&prices, s.macd.slow);

        let bands = bollinger_bands(&prices, s.bollinger_period, s.bollinger_multiplier);
        let upper = align(&bands.upper, n);
        let middle = align(&bands.middle, n);
        let lower = align(&bands.lower, n);

        let vol = align(&rolling_volatility(&prices, s.volatility_window), n);
        let mom = align(&momentum(&prices, s.momentum_period), n);
        let volume_sma = align(&sma(&volumes(points), s.volume_period), n);

        (0..n)
            .map(|i| IndicatorSnapshot {
                rsi: rsi[i],
                macd_line: macd_line[i],
                macd_signal: macd_signal[i],
                macd_histogram: macd_histogram[i],
                ema_short: ema_short[i],
                ema_long: ema_long[i],
                bollinger_upper: upper[i],
                bollinger_middle: middle[i],
                bollinger_lower: lower[i],
                volatility: vol[i],
                momentum: mom[i],
                volume_sma: volume_sma[i],
            })
            .collect()
    }

    /// Snapshot of the last bar, or `None` for an empty series.
    pub fn latest(&self, points: &[PricePoint]) -> Option<IndicatorSnapshot> {
        self.snapshots(points).pop()
    }
}

/// Aligned EMA that stays `None` on series shorter than `period` instead of
/// taking the unchanged-input fallback.
fn strict_ema(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || prices.len() < period {
        return vec![None; prices.len()];
    }
    align(&ema(prices, period), prices.len())
}
