//! RSI (Relative Strength Index) indicator.
//!
//! Average gain and average loss are the rolling means of the positive and
//! negative price changes over the last n changes:
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100 (no losses in the window).
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::{PriceBar, PriceSource};

pub fn calculate_rsi(bars: &[PriceBar], period: usize, source: PriceSource) -> IndicatorSeries {
    let indicator_type = IndicatorType::Rsi { period, source };
    if period == 0 || bars.len() < 2 {
        return IndicatorSeries::from_simple(indicator_type, bars, vec![None; bars.len()]);
    }

    let prices = source.extract(bars);
    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);
    for w in prices.windows(2) {
        let change = w[1] - w[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = vec![None; bars.len()];
    for (i, slot) in values.iter_mut().enumerate().skip(period) {
        // change j lives between bars j and j+1
        let window = (i - period)..i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        let rsi = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
        *slot = Some(rsi);
    }

    IndicatorSeries::from_simple(indicator_type, bars, values)
}
