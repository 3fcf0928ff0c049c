//! Commodity Channel Index.
//!
//! tp = (high + low + close) / 3
//! CCI = (tp - SMA(tp, n)) / (0.015 × mean absolute deviation of tp)
//! A vanishing deviation yields 0.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

const LAMBERT: f64 = 0.015;

pub fn calculate_cci(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let typical: Vec<f64> = bars.iter().map(PriceBar::typical_price).collect();
    let means = rolling_mean(&typical, period);

    let values = means
        .iter()
        .enumerate()
        .map(|(i, mean)| {
            mean.map(|sma| {
                let window = &typical[i + 1 - period..=i];
                let mad = window.iter().map(|tp| (tp - sma).abs()).sum::<f64>() / period as f64;
                if mad <= 1e-12 * sma.abs().max(1.0) {
                    0.0
                } else {
                    (typical[i] - sma) / (LAMBERT * mad)
                }
            })
        })
        .collect();

    IndicatorSeries::from_simple(IndicatorType::Cci(period), bars, values)
}
