//! Stochastic Oscillator.
//!
//! %K = 100 × (close - lowest low) / (highest high - lowest low) over k bars
//! %D = SMA(d) of %K
//! A zero range yields %K = 50.

use crate::domain::indicator::{
    rolling_extremes, rolling_mean, IndicatorPoint, IndicatorSeries, IndicatorType,
    IndicatorValue,
};
use crate::domain::ohlcv::PriceBar;

pub const DEFAULT_K_PERIOD: usize = 14;
pub const DEFAULT_D_PERIOD: usize = 3;

pub fn calculate_stochastic(bars: &[PriceBar], k_period: usize, d_period: usize) -> IndicatorSeries {
    let extremes = rolling_extremes(bars, k_period);
    let k_values: Vec<Option<f64>> = bars
        .iter()
        .zip(&extremes)
        .map(|(bar, ext)| {
            ext.map(|(highest, lowest)| {
                let range = highest - lowest;
                if range == 0.0 {
                    50.0
                } else {
                    100.0 * (bar.close - lowest) / range
                }
            })
        })
        .collect();

    // %D averages only the defined part of %K
    let first_k = k_values.iter().position(Option::is_some);
    let mut d_values = vec![None; bars.len()];
    if let Some(start) = first_k {
        let defined: Vec<f64> = k_values[start..].iter().flatten().copied().collect();
        for (offset, d) in rolling_mean(&defined, d_period).into_iter().enumerate() {
            d_values[start + offset] = d;
        }
    }

    let values = bars
        .iter()
        .zip(k_values.into_iter().zip(d_values))
        .map(|(bar, (k, d))| IndicatorPoint {
            timestamp: bar.timestamp,
            valid: k.is_some(),
            value: IndicatorValue::Stochastic {
                k: k.unwrap_or(f64::NAN),
                d: d.unwrap_or(f64::NAN),
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Stochastic { k_period, d_period },
        values,
    }
}
