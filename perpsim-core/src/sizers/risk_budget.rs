//! Risk-budget sizer.
//!
//! # Formula
//! ```text
//! risk_dollars = account * 2% * confidence * clamp(1 - volatility, 0, 1) * risk_adjustment
//! size         = min(risk_dollars / entry_price, max_position_size)
//! leverage     = max(1, min(max_leverage, default_leverage + |momentum| * 10))
//! stop_loss    = entry * (1 - sl%)   long      entry * (1 + sl%)   short
//! take_profit  = entry * (1 + tp%)   long      entry * (1 - tp%)   short
//! ```
//!
//! Sizes below `min_position_size` produce no order.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;
use crate::params::{ConfigError, StrategyParameters};

/// Fraction of the account put at risk on a full-confidence trade.
pub const BASE_RISK_FRACTION: f64 = 0.02;

/// Leverage added per unit of absolute momentum.
const MOMENTUM_LEVERAGE_SCALE: f64 = 10.0;

/// Inputs for one sizing decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingRequest {
    pub direction: Direction,
    pub confidence: f64,
    pub account_value: f64,
    pub entry_price: f64,
    pub volatility: f64,
    pub momentum: f64,
    /// Milestone factor from the goal tracker, in `(0, 1]`.
    pub risk_adjustment: f64,
}

/// A sized order ready to be filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizedOrder {
    pub direction: Direction,
    pub size: f64,
    pub leverage: f64,
    pub notional: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

#[derive(Debug, Clone)]
pub struct PositionSizer {
    params: StrategyParameters,
}

impl PositionSizer {
    /// Fails fast on invalid parameters.
    pub fn new(params: StrategyParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &StrategyParameters {
        &self.params
    }

    /// Dollars at risk for the request, before conversion to units.
    pub fn risk_dollars(&self, req: &SizingRequest) -> f64 {
        if req.account_value <= 0.0 {
            return 0.0;
        }
        let confidence = req.confidence.clamp(0.0, 1.0);
        let vol_scale = (1.0 - req.volatility).clamp(0.0, 1.0);
        let adjustment = req.risk_adjustment.max(0.0);
        req.account_value * BASE_RISK_FRACTION * confidence * vol_scale * adjustment
    }

    pub fn leverage(&self, momentum: f64) -> f64 {
        let raw = self.params.default_leverage + momentum.abs() * MOMENTUM_LEVERAGE_SCALE;
        raw.min(self.params.max_leverage).max(1.0)
    }

    /// `(stop_loss, take_profit)` price levels for an entry.
    pub fn brackets(&self, direction: Direction, entry_price: f64) -> (f64, f64) {
        let sl = self.params.stop_loss_percentage / 100.0;
        let tp = self.params.take_profit_percentage / 100.0;
        let sign = direction.sign();
        (entry_price * (1.0 - sign * sl), entry_price * (1.0 + sign * tp))
    }

    /// Size an order, or `None` when it would fall below the minimum size.
    pub fn size(&self, req: &SizingRequest) -> Option<SizedOrder> {
        if !(req.entry_price > 0.0) {
            return None;
        }
        let units = (self.risk_dollars(req) / req.entry_price).min(self.params.max_position_size);
        if !units.is_finite() || units < self.params.min_position_size {
            return None;
        }
        let (stop_loss, take_profit) = self.brackets(req.direction, req.entry_price);
        Some(SizedOrder {
            direction: req.direction,
            size: units,
            leverage: self.leverage(req.momentum),
            notional: units * req.entry_price,
            stop_loss,
            take_profit,
        })
    }
}
