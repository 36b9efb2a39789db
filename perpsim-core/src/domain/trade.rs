//! Trade — a completed round trip, immutable once recorded.

use serde::{Deserialize, Serialize};

use super::signal::Direction;

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The signal flipped to the opposite side.
    Reversal,
    StopLoss,
    TakeProfit,
    /// Force-closed on the last bar.
    EndOfData,
}

/// A closed round trip: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "type")]
    pub direction: Direction,
    pub entry_date: i64,
    pub exit_date: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    /// Entry plus exit commission.
    pub commission: f64,
    /// Net of commission.
    pub profit: f64,
    /// `profit` as a percentage of entry notional.
    pub profit_percent: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.profit < 0.0
    }
}
