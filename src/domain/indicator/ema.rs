//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seeded with the first source value (not an SMA), then
//! EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//! The recursion runs from bar 0, but the first (n-1) bars are reported
//! invalid so every indicator shares the same warmup contract.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{PriceBar, PriceSource};

pub fn calculate_ema(bars: &[PriceBar], period: usize, source: PriceSource) -> IndicatorSeries {
    let values = source.extract(bars);
    let ema = ema_raw_values(&values, period);
    let values = ema
        .into_iter()
        .enumerate()
        .map(|(i, v)| (period > 0 && i + 1 >= period).then_some(v))
        .collect();
    IndicatorSeries::from_simple(IndicatorType::Ema { period, source }, bars, values)
}

/// Unmasked EMA recursion seeded by `values[0]`.
pub(crate) fn ema_raw_values(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let Some(&first) = values.first() else {
        return out;
    };
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = first;
    out.push(ema);
    for &v in &values[1..] {
        ema = v * k + ema * (1.0 - k);
        out.push(ema);
    }
    out
}
