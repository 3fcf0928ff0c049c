//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line, seeded at the first defined line value
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line needs max(fast, slow) - 1 bars; signal and histogram
//! need a further signal - 1 bars and stay NaN until then.

use crate::domain::indicator::ema::ema_raw_values;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::{PriceBar, PriceSource};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn calculate_macd(
    bars: &[PriceBar],
    fast: usize,
    slow: usize,
    signal_period: usize,
    source: PriceSource,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Macd {
        fast,
        slow,
        signal: signal_period,
        source,
    };
    if fast == 0 || slow == 0 || signal_period == 0 {
        let values = bars
            .iter()
            .map(|bar| IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: IndicatorValue::Macd {
                    line: f64::NAN,
                    signal: f64::NAN,
                    histogram: f64::NAN,
                },
            })
            .collect();
        return IndicatorSeries {
            indicator_type,
            values,
        };
    }

    let prices = source.extract(bars);
    let ema_fast = ema_raw_values(&prices, fast);
    let ema_slow = ema_raw_values(&prices, slow);
    let line_start = fast.max(slow) - 1;

    let k = 2.0 / (signal_period as f64 + 1.0);
    let mut signal_ema = f64::NAN;

    let mut values = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        if i < line_start {
            values.push(IndicatorPoint {
                timestamp: bar.timestamp,
                valid: false,
                value: IndicatorValue::Macd {
                    line: f64::NAN,
                    signal: f64::NAN,
                    histogram: f64::NAN,
                },
            });
            continue;
        }

        let line = ema_fast[i] - ema_slow[i];
        signal_ema = if i == line_start {
            line
        } else {
            line * k + signal_ema * (1.0 - k)
        };

        let (signal, histogram) = if i + 1 >= line_start + signal_period {
            (signal_ema, line - signal_ema)
        } else {
            (f64::NAN, f64::NAN)
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid: true,
            value: IndicatorValue::Macd {
                line,
                signal,
                histogram,
            },
        });
    }

    IndicatorSeries {
        indicator_type,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;
    use crate::domain::indicator::IndicatorField;
    use approx::assert_relative_eq;

    #[test]
    fn macd_line_before_signal() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let series = calculate_macd(&make_bars(&prices), 2, 4, 3, PriceSource::Close);

        assert!(series.value_at(2, IndicatorField::MacdLine).is_none());
        assert!(series.value_at(3, IndicatorField::MacdLine).is_some());
        assert!(series.value_at(4, IndicatorField::MacdSignal).is_none());
        assert!(series.value_at(5, IndicatorField::MacdSignal).is_some());
        assert!(series.value_at(5, IndicatorField::MacdHistogram).is_some());
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let series = calculate_macd(&make_bars(&[50.0; 40]), 12, 26, 9, PriceSource::Close);
        for i in 34..40 {
            assert_relative_eq!(series.value_at(i, IndicatorField::MacdLine).unwrap(), 0.0);
            assert_relative_eq!(series.value_at(i, IndicatorField::MacdSignal).unwrap(), 0.0);
            assert_relative_eq!(series.value_at(i, IndicatorField::MacdHistogram).unwrap(), 0.0);
        }
    }

    #[test]
    fn macd_rising_prices_positive_line() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let series = calculate_macd(&make_bars(&prices), 12, 26, 9, PriceSource::Close);
        assert!(series.value_at(39, IndicatorField::MacdLine).unwrap() > 0.0);
    }

    #[test]
    fn macd_histogram_is_line_minus_signal() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + ((i * 5) % 7) as f64).collect();
        let series = calculate_macd(&make_bars(&prices), 3, 6, 4, PriceSource::Close);
        for i in 8..30 {
            let line = series.value_at(i, IndicatorField::MacdLine).unwrap();
            let signal = series.value_at(i, IndicatorField::MacdSignal).unwrap();
            let hist = series.value_at(i, IndicatorField::MacdHistogram).unwrap();
            assert_relative_eq!(hist, line - signal, epsilon = 1e-12);
        }
    }

    #[test]
    fn macd_zero_period_is_invalid() {
        let series = calculate_macd(&make_bars(&[1.0, 2.0]), 0, 26, 9, PriceSource::Close);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }
}
