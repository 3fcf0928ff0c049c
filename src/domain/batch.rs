//! Runs several independent strategies over one price series.
//!
//! Each run owns its own portfolio and trade log; only the bars are shared
//! (read-only), so runs go to the rayon pool without locking.

use std::sync::atomic::AtomicBool;

use rayon::prelude::*;

use super::backtest::{run_backtest_with_cancel, BacktestResult};
use super::error::StratforgeError;
use super::ohlcv::{check_series, PriceBar};
use super::strategy::StrategySpec;

/// Backtest every spec in parallel. Results keep the order of `specs`.
pub fn run_batch(specs: &[StrategySpec], bars: &[PriceBar]) -> Result<Vec<BacktestResult>, StratforgeError> {
    run_batch_with_cancel(specs, bars, &AtomicBool::new(false))
}

/// As `run_batch`; setting `cancel` stops every run at its next bar.
pub fn run_batch_with_cancel(
    specs: &[StrategySpec],
    bars: &[PriceBar],
    cancel: &AtomicBool,
) -> Result<Vec<BacktestResult>, StratforgeError> {
    check_series(bars)?;
    Ok(specs
        .par_iter()
        .map(|spec| run_backtest_with_cancel(spec, bars, cancel))
        .collect())
}

/// Sequential variant, same results as `run_batch`.
pub fn run_batch_sequential(
    specs: &[StrategySpec],
    bars: &[PriceBar],
) -> Result<Vec<BacktestResult>, StratforgeError> {
    check_series(bars)?;
    let cancel = AtomicBool::new(false);
    Ok(specs
        .iter()
        .map(|spec| run_backtest_with_cancel(spec, bars, &cancel))
        .collect())
}
