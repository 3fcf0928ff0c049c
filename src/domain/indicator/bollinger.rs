//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation of the same window.
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are invalid.

use crate::domain::indicator::stddev::rolling_stddev;
use crate::domain::indicator::{
    rolling_mean, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::{PriceBar, PriceSource};

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;
pub const MAX_MULTIPLIER: f64 = 10.0;

/// The multiplier in hundredths, when it is in (0, MAX_MULTIPLIER] and has
/// at most two decimals. Anything else would not survive the engine key.
pub fn multiplier_x100(multiplier: f64) -> Option<u32> {
    if !multiplier.is_finite() || multiplier <= 0.0 || multiplier > MAX_MULTIPLIER {
        return None;
    }
    let scaled = multiplier * 100.0;
    let rounded = scaled.round();
    ((scaled - rounded).abs() < 1e-6 && rounded >= 1.0).then_some(rounded as u32)
}

pub fn calculate_bollinger(
    bars: &[PriceBar],
    period: usize,
    stddev_mult_x100: u32,
    source: PriceSource,
) -> IndicatorSeries {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let prices = source.extract(bars);
    let middles = rolling_mean(&prices, period);
    let deviations = rolling_stddev(&prices, period);

    let values = bars
        .iter()
        .zip(middles.into_iter().zip(deviations))
        .map(|(bar, pair)| match pair {
            (Some(middle), Some(sd)) => IndicatorPoint {
                timestamp: bar.timestamp,
                valid: true,
                value: IndicatorValue::Bollinger {
                    upper: middle + mult * sd,
                    middle,
                    lower: middle - mult * sd,
                },
            },
            _ => IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: IndicatorValue::Bollinger {
                    upper: f64::NAN,
                    middle: f64::NAN,
                    lower: f64::NAN,
                },
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
            source,
        },
        values,
    }
}
