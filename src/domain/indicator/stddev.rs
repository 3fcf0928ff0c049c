//! Rolling standard deviation used by Bollinger Bands.
//!
//! Sample standard deviation (divides by n-1) over the trailing n values.
//! A one-value window has no spread and yields 0.

pub(crate) fn rolling_stddev(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            if period == 1 {
                return Some(0.0);
            }
            let window = &values[i + 1 - period..=i];
            let mean = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (period - 1) as f64;
            Some(variance.sqrt())
        })
        .collect()
}
