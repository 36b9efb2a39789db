use serde::{Deserialize, Serialize};

use super::price::PricePoint;
use super::signal::Direction;
use super::trade::ExitReason;

/// The single open position of a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    /// Fill price after slippage.
    pub entry_price: f64,
    /// Quantity in base units.
    pub size: f64,
    /// Leverage chosen by the sizer. Replay settles PnL on `size` directly,
    /// so this is informational there; live hosts use it to place the order.
    pub leverage: f64,
    pub entry_time: i64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Commission paid when the position was opened.
    pub entry_commission: f64,
}

impl Position {
    pub fn notional(&self) -> f64 {
        self.entry_price * self.size
    }

    /// Price PnL at `price`, before commissions.
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.direction.sign() * (price - self.entry_price) * self.size
    }

    /// Bracket exit for `bar`: the fill price and the matching exit reason.
    ///
    /// A level triggers when the bar's range reaches it. The fill is the
    /// level itself, or the open when the bar opened past the level (a gap
    /// through a stop fills worse, a gap through a target fills better).
    /// Stop-loss is checked first when one bar reaches both.
    pub fn bracket_hit(&self, bar: &PricePoint) -> Option<(f64, ExitReason)> {
        match self.direction {
            Direction::Long if bar.low <= self.stop_loss => {
                Some((bar.open.min(self.stop_loss), ExitReason::StopLoss))
            }
            Direction::Long if bar.high >= self.take_profit => {
                Some((bar.open.max(self.take_profit), ExitReason::TakeProfit))
            }
            Direction::Short if bar.high >= self.stop_loss => {
                Some((bar.open.max(self.stop_loss), ExitReason::StopLoss))
            }
            Direction::Short if bar.low <= self.take_profit => {
                Some((bar.open.min(self.take_profit), ExitReason::TakeProfit))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_at(entry: f64) -> Position {
        Position {
            direction: Direction::Long,
            entry_price: entry,
            size: 2.0,
            leverage: 2.0,
            entry_time: 0,
            stop_loss: entry * 0.95,
            take_profit: entry * 1.15,
            entry_commission: 0.0,
        }
    }

    fn bar(open: f64, high: f64, low: f64, close: f64) -> PricePoint {
        PricePoint::new(0, open, high, low, close, 1_000.0)
    }

    #[test]
    fn long_pnl_and_notional() {
        let pos = long_at(100.0);
        assert_eq!(pos.unrealized_pnl(110.0), 20.0);
        assert_eq!(pos.notional(), 200.0);
    }

    #[test]
    fn short_pnl_is_inverted() {
        let mut pos = long_at(100.0);
        pos.direction = Direction::Short;
        assert_eq!(pos.unrealized_pnl(90.0), 20.0);
    }

    #[test]
    fn long_brackets_fill_at_level_inside_the_bar() {
        let pos = long_at(100.0);
        assert_eq!(pos.bracket_hit(&bar(100.0, 101.0, 99.0, 100.0)), None);
        assert_eq!(
            pos.bracket_hit(&bar(98.0, 99.0, 94.0, 96.0)),
            Some((pos.stop_loss, ExitReason::StopLoss))
        );
        assert_eq!(
            pos.bracket_hit(&bar(110.0, 118.0, 109.0, 112.0)),
            Some((pos.take_profit, ExitReason::TakeProfit))
        );
    }

    #[test]
    fn long_gap_through_fills_at_open() {
        let pos = long_at(100.0);
        assert_eq!(
            pos.bracket_hit(&bar(50.0, 50.0, 50.0, 50.0)),
            Some((50.0, ExitReason::StopLoss))
        );
        assert_eq!(
            pos.bracket_hit(&bar(130.0, 131.0, 125.0, 126.0)),
            Some((130.0, ExitReason::TakeProfit))
        );
    }

    #[test]
    fn short_brackets() {
        let pos = Position {
            direction: Direction::Short,
            stop_loss: 105.0,
            take_profit: 85.0,
            ..long_at(100.0)
        };
        assert_eq!(
            pos.bracket_hit(&bar(102.0, 106.0, 101.0, 103.0)),
            Some((105.0, ExitReason::StopLoss))
        );
        assert_eq!(
            pos.bracket_hit(&bar(110.0, 112.0, 108.0, 111.0)),
            Some((110.0, ExitReason::StopLoss))
        );
        assert_eq!(
            pos.bracket_hit(&bar(80.0, 82.0, 79.0, 81.0)),
            Some((80.0, ExitReason::TakeProfit))
        );
        assert_eq!(pos.bracket_hit(&bar(99.0, 100.0, 98.0, 99.0)), None);
    }

    #[test]
    fn stop_wins_when_one_bar_reaches_both_levels() {
        let pos = long_at(100.0);
        assert_eq!(
            pos.bracket_hit(&bar(100.0, 120.0, 90.0, 110.0)),
            Some((pos.stop_loss, ExitReason::StopLoss))
        );
    }
}
