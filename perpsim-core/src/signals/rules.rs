//! Indicator rule set — one canonical decision per bar.
//!
//! Rules are evaluated in priority order and the first match wins:
//! 1. Oversold reversal: RSI < oversold, MACD histogram > 0, close < short EMA → Buy.
//! 2. Overbought reversal: RSI > overbought, histogram < 0, close > short EMA → Sell.
//! 3. MACD crossover: histogram changes sign since the previous bar → Buy / Sell.
//! 4. Prediction deviation: predicted close more than the threshold away → Buy / Sell.
//! 5. Otherwise Hold.
//!
//! With `require_volume_confirmation`, rules 1 and 2 also need the bar's volume
//! above its moving average.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;
use crate::indicators::IndicatorSnapshot;
use crate::params::{check_threshold, ConfigError};

/// Histogram magnitudes at or below this are treated as exactly zero.
pub const HISTOGRAM_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub oversold: f64,
    pub overbought: f64,
    pub reversal_confidence: f64,
    pub crossover_confidence: f64,
    pub prediction_confidence: f64,
    /// Fractional deviation of the predicted close that triggers rule 4.
    pub prediction_threshold: f64,
    pub require_volume_confirmation: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
            reversal_confidence: 0.7,
            crossover_confidence: 0.6,
            prediction_confidence: 0.8,
            prediction_threshold: 0.02,
            require_volume_confirmation: false,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bands_ok = self.oversold >= 0.0
            && self.overbought <= 100.0
            && self.oversold < self.overbought;
        if !bands_ok {
            return Err(ConfigError::InvalidRsiBands {
                oversold: self.oversold,
                overbought: self.overbought,
            });
        }
        for (name, value) in [
            ("reversal_confidence", self.reversal_confidence),
            ("crossover_confidence", self.crossover_confidence),
            ("prediction_confidence", self.prediction_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ConfidenceOutOfRange { name, value });
            }
        }
        check_threshold("prediction_threshold", self.prediction_threshold)
    }
}

/// Everything the rules may look at for one bar.
#[derive(Debug, Clone, Copy)]
pub struct BarContext<'a> {
    pub current: &'a IndicatorSnapshot,
    pub previous: Option<&'a IndicatorSnapshot>,
    pub price: f64,
    pub volume: f64,
    pub predicted_price: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SignalGenerator {
    config: SignalConfig,
}

impl SignalGenerator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn evaluate(&self, ctx: &BarContext<'_>) -> Signal {
        let cfg = &self.config;
        let snap = ctx.current;

        if let (Some(rsi), Some(hist), Some(ema)) =
            (snap.rsi, snap.macd_histogram.map(denoise), snap.ema_short)
        {
            let volume_ok = !cfg.require_volume_confirmation || self.volume_confirmed(ctx);
            if volume_ok && rsi < cfg.oversold && hist > 0.0 && ctx.price < ema {
                return Signal::buy(cfg.reversal_confidence);
            }
            if volume_ok && rsi > cfg.overbought && hist < 0.0 && ctx.price > ema {
                return Signal::sell(cfg.reversal_confidence);
            }
        }

        let prev_hist = ctx.previous.and_then(|p| p.macd_histogram).map(denoise);
        if let (Some(before), Some(now)) = (prev_hist, snap.macd_histogram.map(denoise)) {
            if before <= 0.0 && now > 0.0 {
                return Signal::buy(cfg.crossover_confidence);
            }
            if before >= 0.0 && now < 0.0 {
                return Signal::sell(cfg.crossover_confidence);
            }
        }

        if let Some(predicted) = ctx.predicted_price {
            if ctx.price > 0.0 {
                let deviation = (predicted - ctx.price) / ctx.price;
                if deviation > cfg.prediction_threshold {
                    return Signal::buy(cfg.prediction_confidence);
                }
                if deviation < -cfg.prediction_threshold {
                    return Signal::sell(cfg.prediction_confidence);
                }
            }
        }

        Signal::hold()
    }

    fn volume_confirmed(&self, ctx: &BarContext<'_>) -> bool {
        ctx.current
            .volume_sma
            .map(|avg| ctx.volume > avg)
            .unwrap_or(false)
    }
}

fn denoise(h: f64) -> f64 {
    if h.abs() <= HISTOGRAM_EPSILON {
        0.0
    } else {
        h
    }
}
