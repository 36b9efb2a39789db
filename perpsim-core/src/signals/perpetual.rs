//! Perpetual-futures direction rule.
//!
//! Funding rate and momentum decide which side of a perp to take:
//! - volatility above `volatility_threshold` → stand aside.
//! - average funding above `funding_rate_threshold` → short (longs are paying).
//! - average funding below `-funding_rate_threshold` → long (shorts are paying).
//! - otherwise follow the sign of momentum.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, Signal};
use crate::params::StrategyParameters;

/// Confidence of a funding-driven decision.
pub const FUNDING_CONFIDENCE: f64 = 0.7;
/// Confidence of a momentum-driven decision.
pub const MOMENTUM_CONFIDENCE: f64 = 0.6;

/// Outcome of the perp rule: a side to take or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerpDecision {
    pub direction: Option<Direction>,
    pub confidence: f64,
}

impl PerpDecision {
    fn stand_aside() -> Self {
        Self {
            direction: None,
            confidence: 0.0,
        }
    }

    fn take(direction: Direction, confidence: f64) -> Self {
        Self {
            direction: Some(direction),
            confidence,
        }
    }

    /// Same decision in buy/sell/hold form.
    pub fn to_signal(self) -> Signal {
        match self.direction {
            Some(d) => Signal::new(d.entry_action(), self.confidence),
            None => Signal::hold(),
        }
    }
}

/// Mean of the funding rates observed over the lookback. 0.0 when empty.
pub fn average_funding_rate(rates: &[f64]) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().sum::<f64>() / rates.len() as f64
}

pub fn resolve_perp_direction(
    params: &StrategyParameters,
    avg_funding_rate: f64,
    momentum: f64,
    volatility: f64,
) -> PerpDecision {
    if volatility > params.volatility_threshold {
        return PerpDecision::stand_aside();
    }
    if avg_funding_rate > params.funding_rate_threshold {
        return PerpDecision::take(Direction::Short, FUNDING_CONFIDENCE);
    }
    if avg_funding_rate < -params.funding_rate_threshold {
        return PerpDecision::take(Direction::Long, FUNDING_CONFIDENCE);
    }
    if momentum > 0.0 {
        PerpDecision::take(Direction::Long, MOMENTUM_CONFIDENCE)
    } else if momentum < 0.0 {
        PerpDecision::take(Direction::Short, MOMENTUM_CONFIDENCE)
    } else {
        PerpDecision::stand_aside()
    }
}
