//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar out.
//! Computed once over a finished run, never incrementally.

use serde::{Deserialize, Serialize};
use signallab_core::domain::Trade;

/// Trading periods per year for daily bars.
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// Aggregate performance report for a single backtest run.
///
/// Returns and drawdown are fractions (0.05 = 5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    /// Largest peak-to-trough decline, in [0, 1].
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    /// Mean winning PnL over absolute mean losing PnL. `None` without losers.
    pub profit_loss_ratio: Option<f64>,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub total_commission: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    pub avg_bars_held: f64,
}

impl PerformanceReport {
    /// Compute all metrics from an equity curve and trade list.
    pub fn compute(
        equity_curve: &[f64],
        trades: &[Trade],
        initial_capital: f64,
        periods_per_year: f64,
    ) -> Self {
        let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);
        let total = total_return(final_equity, initial_capital);
        Self {
            initial_capital,
            final_equity,
            total_return: total,
            annualized_return: annualized_return(total, equity_curve.len(), periods_per_year),
            max_drawdown: max_drawdown(equity_curve),
            sharpe_ratio: sharpe_ratio(equity_curve, periods_per_year),
            sortino_ratio: sortino_ratio(equity_curve, periods_per_year),
            trade_count: trades.len(),
            win_rate: win_rate(trades),
            profit_loss_ratio: profit_loss_ratio(trades),
            avg_win: avg_win(trades),
            avg_loss: avg_loss(trades),
            total_commission: trades.iter().map(|t| t.commission).sum(),
            max_consecutive_wins: max_consecutive(trades, true),
            max_consecutive_losses: max_consecutive(trades, false),
            avg_bars_held: avg_bars_held(trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: final / initial - 1.
pub fn total_return(final_equity: f64, initial_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    final_equity / initial_capital - 1.0
}

/// Geometric annualization: (1 + total)^(periods_per_year / num_periods) - 1.
///
/// Returns 0.0 for an empty curve.
pub fn annualized_return(total_return: f64, num_periods: usize, periods_per_year: f64) -> f64 {
    if num_periods == 0 {
        return 0.0;
    }
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(periods_per_year / num_periods as f64) - 1.0
}

/// Maximum drawdown as a positive fraction (0.15 = 15% below the running peak).
///
/// Returns 0.0 if equity never declines.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        peak = peak.max(eq);
        if peak > 0.0 {
            max_dd = max_dd.max((peak - eq) / peak);
        }
    }
    max_dd
}

/// Annualized Sharpe ratio with no risk-free rate.
///
/// Sharpe = mean(returns) / sample_std(returns) * sqrt(periods_per_year).
/// Returns 0.0 if the deviation is zero or there are fewer than 2 returns.
pub fn sharpe_ratio(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    let returns = period_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / std * periods_per_year.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
///
/// Returns 0.0 if there is no downside or fewer than 2 returns.
pub fn sortino_ratio(equity_curve: &[f64], periods_per_year: f64) -> f64 {
    let returns = period_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let downside_sq: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    let downside_std = (downside_sq / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / downside_std * periods_per_year.sqrt()
}

/// Win rate: fraction of trades with positive PnL. 0.0 with no trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Mean winning PnL divided by the absolute mean losing PnL.
///
/// `None` when there are no losing trades. With losers but no winners the
/// ratio is 0.0.
pub fn profit_loss_ratio(trades: &[Trade]) -> Option<f64> {
    let loss = avg_loss(trades);
    if !trades.iter().any(Trade::is_loser) {
        return None;
    }
    Some(avg_win(trades) / loss.abs())
}

/// Mean PnL of winning trades (0.0 if none).
pub fn avg_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl).collect();
    mean_f64(&wins)
}

/// Mean PnL of losing trades, a negative number (0.0 if none).
pub fn avg_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades.iter().filter(|t| t.is_loser()).map(|t| t.pnl).collect();
    mean_f64(&losses)
}

pub fn avg_bars_held(trades: &[Trade]) -> f64 {
    let held: Vec<f64> = trades.iter().map(|t| t.bars_held() as f64).collect();
    mean_f64(&held)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple per-period returns: e[t] / e[t-1] - 1.
pub fn period_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        let matches = if winners {
            trade.is_winner()
        } else {
            trade.is_loser()
        };
        if matches {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
