//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean of the trailing n source values.
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{rolling_mean, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{PriceBar, PriceSource};

pub fn calculate_sma(bars: &[PriceBar], period: usize, source: PriceSource) -> IndicatorSeries {
    let values = source.extract(bars);
    IndicatorSeries::from_simple(
        IndicatorType::Sma { period, source },
        bars,
        rolling_mean(&values, period),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;
    use crate::domain::indicator::IndicatorField;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3, PriceSource::Close);
        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
    }

    #[test]
    fn sma_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3, PriceSource::Close);
        assert_relative_eq!(series.value_at(2, IndicatorField::Value).unwrap(), 20.0);
        assert_relative_eq!(series.value_at(3, IndicatorField::Value).unwrap(), 30.0);
    }

    #[test]
    fn sma_reads_requested_source() {
        let mut bars = make_bars(&[10.0, 20.0]);
        bars[0].high = 12.0;
        bars[1].high = 24.0;
        let series = calculate_sma(&bars, 2, PriceSource::High);
        assert_relative_eq!(series.value_at(1, IndicatorField::Value).unwrap(), 18.0);
    }

    #[test]
    fn sma_period_longer_than_series() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 5, PriceSource::Close);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_empty_bars() {
        let series = calculate_sma(&[], 3, PriceSource::Close);
        assert!(series.values.is_empty());
    }
}
