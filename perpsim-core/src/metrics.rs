//! Performance metrics — pure functions over an equity curve or trade log.
//!
//! Percentages are expressed in percent (5.0 = 5%). Every function returns a
//! finite value; degenerate input yields 0.0.

use crate::domain::Trade;

/// `(final - initial) / initial * 100`.
pub fn total_return_pct(initial_capital: f64, final_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_capital - initial_capital) / initial_capital * 100.0
}

/// Simple per-bar returns of an equity curve. A non-positive base yields 0.
pub fn per_bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Annualized Sharpe ratio of per-bar returns.
///
/// Sharpe = mean(r - rf/periods) / std(r - rf/periods) * sqrt(periods).
/// Returns 0.0 if the deviation is zero or there are fewer than 2 returns.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    let returns = per_bar_returns(equity_curve);
    if returns.len() < 2 || periods_per_year <= 0.0 {
        return 0.0;
    }
    let per_bar_rf = risk_free_rate / periods_per_year;
    let excess: Vec<f64> = returns.iter().map(|r| r - per_bar_rf).collect();
    let mean = mean(&excess);
    let std = sample_std(&excess);
    if std < 1e-15 {
        return 0.0;
    }
    mean / std * periods_per_year.sqrt()
}

/// Running `(peak - value) / peak * 100` for every point of the curve.
pub fn drawdown_curve(equity_curve: &[f64]) -> Vec<f64> {
    let mut peak = f64::MIN;
    equity_curve
        .iter()
        .map(|&eq| {
            peak = peak.max(eq);
            if peak > 0.0 {
                (peak - eq) / peak * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

/// Largest value of a drawdown curve, 0.0 when empty.
pub fn max_drawdown_pct(drawdown: &[f64]) -> f64 {
    drawdown.iter().copied().fold(0.0, f64::max)
}

/// Winning trades over all trades, in percent. 0.0 with no trades.
pub fn win_rate_pct(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

/// Gross profit / gross loss. With no losing trades the gross profit is
/// returned as-is.
pub fn profit_factor(trades: &[Trade]) -> f64 {
    let gross_profit: f64 = trades.iter().filter(|t| t.profit > 0.0).map(|t| t.profit).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.profit < 0.0)
        .map(|t| t.profit.abs())
        .sum();
    if gross_loss == 0.0 {
        return gross_profit;
    }
    gross_profit / gross_loss
}

/// Longest run of losing trades.
pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for trade in trades {
        if trade.is_loser() {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, ExitReason};

    fn trade(profit: f64) -> Trade {
        Trade {
            direction: Direction::Long,
            entry_date: 0,
            exit_date: 1,
            entry_price: 100.0,
            exit_price: 100.0 + profit,
            size: 1.0,
            commission: 0.0,
            profit,
            profit_percent: profit,
            exit_reason: ExitReason::Reversal,
        }
    }

    #[test]
    fn total_return() {
        assert!((total_return_pct(1_000.0, 1_100.0) - 10.0).abs() < 1e-12);
        assert_eq!(total_return_pct(0.0, 1_100.0), 0.0);
    }

    #[test]
    fn sharpe_constant_equity_is_zero() {
        assert_eq!(sharpe_ratio(&[100.0; 50], 0.02, 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[100.0], 0.0, 252.0), 0.0);
    }

    #[test]
    fn sharpe_positive_for_steady_gains() {
        let mut eq = vec![100_000.0];
        for i in 1..253 {
            let r = if i % 2 == 0 { 1.002 } else { 1.0005 };
            eq.push(eq[i - 1] * r);
        }
        assert!(sharpe_ratio(&eq, 0.02, 252.0) > 5.0);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let dd = drawdown_curve(&[100.0, 120.0, 90.0, 130.0]);
        assert_eq!(dd[0], 0.0);
        assert_eq!(dd[1], 0.0);
        assert!((dd[2] - 25.0).abs() < 1e-12);
        assert_eq!(dd[3], 0.0);
        assert!((max_drawdown_pct(&dd) - 25.0).abs() < 1e-12);
        assert_eq!(max_drawdown_pct(&[]), 0.0);
    }

    #[test]
    fn win_rate_empty_is_zero() {
        assert_eq!(win_rate_pct(&[]), 0.0);
        let trades = [trade(10.0), trade(-5.0), trade(3.0), trade(-1.0)];
        assert!((win_rate_pct(&trades) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_without_losses_returns_gross_profit() {
        assert_eq!(profit_factor(&[trade(10.0), trade(5.0)]), 15.0);
        assert_eq!(profit_factor(&[]), 0.0);
        assert!((profit_factor(&[trade(10.0), trade(-4.0)]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn losing_streak() {
        let trades = [trade(-1.0), trade(-1.0), trade(2.0), trade(-1.0), trade(-1.0), trade(-1.0)];
        assert_eq!(max_consecutive_losses(&trades), 3);
        assert_eq!(max_consecutive_losses(&[]), 0);
    }
}
