//! Performance metrics computed once at the end of a run.

use serde::{Deserialize, Serialize};

use super::portfolio::{EquityPoint, Portfolio};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_return_pct: f64,
    /// Closed (SELL) trades.
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub largest_win_pct: f64,
    pub largest_loss_pct: f64,
    pub max_drawdown_pct: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio) -> Self {
        let initial_capital = portfolio.initial_capital;
        let total_return_pct = if initial_capital > 0.0 {
            (portfolio.capital - initial_capital) / initial_capital * 100.0
        } else {
            0.0
        };

        let mut total_trades = 0usize;
        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;
        let mut largest_win_pct = 0.0_f64;
        let mut largest_loss_pct = 0.0_f64;

        for pnl in portfolio.sells().filter_map(|t| t.pnl_pct) {
            total_trades += 1;
            if pnl > 0.0 {
                winning_trades += 1;
                total_wins += pnl;
                largest_win_pct = largest_win_pct.max(pnl);
            } else if pnl < 0.0 {
                losing_trades += 1;
                total_losses += pnl.abs();
                largest_loss_pct = largest_loss_pct.max(pnl.abs());
            }
        }

        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };
        let avg_win_pct = if winning_trades > 0 {
            total_wins / winning_trades as f64
        } else {
            0.0
        };
        let avg_loss_pct = if losing_trades > 0 {
            total_losses / losing_trades as f64
        } else {
            0.0
        };

        Metrics {
            total_return_pct,
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            avg_win_pct,
            avg_loss_pct,
            largest_win_pct,
            largest_loss_pct,
            max_drawdown_pct: compute_drawdown(&portfolio.equity_curve),
        }
    }
}

/// Largest peak-to-trough decline of the curve, as a percentage of the peak.
pub fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.capital;
    let mut max_dd = 0.0_f64;
    for point in equity_curve {
        if point.capital > peak {
            peak = point.capital;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.capital) / peak);
        }
    }
    max_dd * 100.0
}
