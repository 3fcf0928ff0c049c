//! Backtest engine and event loop.
//!
//! One position at a time, bars processed strictly in order:
//!
//! - FLAT: all enabled ENTRY conditions hold -> BUY at the close
//! - LONG: close <= stop -> STOP_LOSS, else close >= target -> TARGET,
//!   else any enabled EXIT condition -> EXIT_SIGNAL
//!
//! No decisions are taken before the strategy's warmup bar. An equity
//! point is appended for every processed bar.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::condition_eval::{entry_signal, exit_signal};
use super::execution::{check_risk_exit, enter_long, exit_long, EntryResult};
use super::indicator::{compute_indicators, IndicatorSeries, IndicatorType};
use super::metrics::Metrics;
use super::ohlcv::PriceBar;
use super::portfolio::{EquityPoint, Portfolio};
use super::position::{Trade, TradeReason};
use super::strategy::StrategySpec;

pub const DEFAULT_TRADE_HISTORY: usize = 5;
pub const DEFAULT_EQUITY_HISTORY: usize = 100;

/// Controls how runs are scheduled and reported, not the simulation itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub trade_history: usize,
    pub equity_history: usize,
    /// Run a batch across the rayon pool instead of one strategy at a time.
    pub parallel: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            trade_history: DEFAULT_TRADE_HISTORY,
            equity_history: DEFAULT_EQUITY_HISTORY,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub insufficient_data: bool,
    pub warmup_bars: usize,
    pub cancelled: bool,
}

/// The tail of a result: the most recent trades and equity points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub strategy_name: String,
    pub initial_capital: f64,
    pub final_capital: f64,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub insufficient_data: bool,
    pub cancelled: bool,
}

fn tail<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}

impl BacktestResult {
    pub fn report(&self, config: &BacktestConfig) -> BacktestReport {
        BacktestReport {
            strategy_name: self.strategy_name.clone(),
            initial_capital: self.initial_capital,
            final_capital: self.final_capital,
            metrics: self.metrics.clone(),
            trades: tail(&self.trades, config.trade_history),
            equity_curve: tail(&self.equity_curve, config.equity_history),
            insufficient_data: self.insufficient_data,
            cancelled: self.cancelled,
        }
    }
}

pub fn run_backtest(spec: &StrategySpec, bars: &[PriceBar]) -> BacktestResult {
    run_backtest_with_cancel(spec, bars, &AtomicBool::new(false))
}

/// As `run_backtest`, stopping before the next bar once `cancel` is set.
pub fn run_backtest_with_cancel(
    spec: &StrategySpec,
    bars: &[PriceBar],
    cancel: &AtomicBool,
) -> BacktestResult {
    let mm = &spec.money_management;
    let warmup = spec.warmup();
    let mut portfolio = Portfolio::new(mm.initial_capital);

    // at least one bar must be decidable
    if bars.len() <= warmup {
        warn!(
            strategy = %spec.name,
            bars = bars.len(),
            warmup,
            "insufficient data for warmup"
        );
        for bar in bars {
            portfolio.record_equity(bar.timestamp);
        }
        return finish(spec, portfolio, warmup, true, false);
    }

    let indicators = compute_indicators(bars, &spec.indicator_types());
    let mut cancelled = false;

    for (i, bar) in bars.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }
        if i >= warmup {
            step(spec, &indicators, &mut portfolio, bars, i);
        }
        portfolio.record_equity(bar.timestamp);
    }

    if cancelled {
        info!(strategy = %spec.name, processed = portfolio.equity_curve.len(), "backtest cancelled");
    }
    finish(spec, portfolio, warmup, false, cancelled)
}

fn step(
    spec: &StrategySpec,
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    portfolio: &mut Portfolio,
    bars: &[PriceBar],
    i: usize,
) {
    let bar = &bars[i];
    let mm = &spec.money_management;

    if portfolio.position.is_long() {
        let reason = check_risk_exit(&portfolio.position, bar.close).or_else(|| {
            exit_signal(&spec.exit_conditions, indicators, i).then_some(TradeReason::ExitSignal)
        });
        if let Some(reason) = reason {
            let quantity = portfolio.position.quantity;
            if let Some(pnl_pct) =
                exit_long(portfolio, bar.close, bar.timestamp, reason, mm.commission_rate)
            {
                debug!(
                    bar = i,
                    price = bar.close,
                    quantity,
                    reason = reason.as_str(),
                    pnl_pct,
                    capital = portfolio.capital,
                    "closed long"
                );
            }
        }
    } else if entry_signal(&spec.entry_conditions, indicators, i) {
        match enter_long(portfolio, bar.close, bar.timestamp, mm) {
            EntryResult::Entered { quantity, price } => debug!(
                bar = i,
                price,
                quantity,
                reason = TradeReason::EntrySignal.as_str(),
                "opened long"
            ),
            EntryResult::InsufficientCapital => debug!(
                bar = i,
                price = bar.close,
                capital = portfolio.capital,
                "entry skipped: capital buys zero units"
            ),
        }
    }
}

fn finish(
    spec: &StrategySpec,
    portfolio: Portfolio,
    warmup: usize,
    insufficient_data: bool,
    cancelled: bool,
) -> BacktestResult {
    let metrics = Metrics::compute(&portfolio);
    info!(
        strategy = %spec.name,
        final_capital = portfolio.capital,
        total_return_pct = metrics.total_return_pct,
        total_trades = metrics.total_trades,
        win_rate = metrics.win_rate,
        "backtest complete"
    );
    BacktestResult {
        strategy_name: spec.name.clone(),
        initial_capital: portfolio.initial_capital,
        final_capital: portfolio.capital,
        metrics,
        trades: portfolio.trades,
        equity_curve: portfolio.equity_curve,
        insufficient_data,
        warmup_bars: warmup,
        cancelled,
    }
}
