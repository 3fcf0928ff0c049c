//! OHLCV price bar representation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::error::StratforgeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn price(&self, source: PriceSource) -> f64 {
        match source {
            PriceSource::Open => self.open,
            PriceSource::High => self.high,
            PriceSource::Low => self.low,
            PriceSource::Close => self.close,
        }
    }
}

/// Which price field a single-series indicator reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl PriceSource {
    pub const ALL: [PriceSource; 4] = [
        PriceSource::Open,
        PriceSource::High,
        PriceSource::Low,
        PriceSource::Close,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceSource::Open => "open",
            PriceSource::High => "high",
            PriceSource::Low => "low",
            PriceSource::Close => "close",
        }
    }

    pub fn extract(&self, bars: &[PriceBar]) -> Vec<f64> {
        bars.iter().map(|b| b.price(*self)).collect()
    }
}

/// Check that a series is usable by the simulator: strictly increasing
/// timestamps and finite, positive prices.
pub fn check_series(bars: &[PriceBar]) -> Result<(), StratforgeError> {
    for (i, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(StratforgeError::PriceData {
                reason: format!("bar {} at {} has a non-positive or non-finite price", i, bar.timestamp),
            });
        }
        if bar.low > bar.high {
            return Err(StratforgeError::PriceData {
                reason: format!("bar {} at {} has low above high", i, bar.timestamp),
            });
        }
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(StratforgeError::PriceData {
                reason: format!(
                    "timestamps must be strictly increasing: bar {} ({}) follows {}",
                    i,
                    bar.timestamp,
                    bars[i - 1].timestamp
                ),
            });
        }
    }
    Ok(())
}
