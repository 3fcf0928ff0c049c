//! Williams %R.
//!
//! %R = -100 × (highest high - close) / (highest high - lowest low) over n bars.
//! A zero range yields -50.

use crate::domain::indicator::{rolling_extremes, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_williams_r(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let values = bars
        .iter()
        .zip(rolling_extremes(bars, period))
        .map(|(bar, ext)| {
            ext.map(|(highest, lowest)| {
                let range = highest - lowest;
                if range == 0.0 {
                    -50.0
                } else {
                    -100.0 * (highest - bar.close) / range
                }
            })
        })
        .collect();
    IndicatorSeries::from_simple(IndicatorType::WilliamsR(period), bars, values)
}
