//! Price data port trait.

use crate::domain::error::StratforgeError;
use crate::domain::ohlcv::PriceBar;

/// Source of a historical price series.
pub trait DataPort {
    /// Bars for `source` in strictly increasing timestamp order.
    fn fetch_bars(&self, source: &str) -> Result<Vec<PriceBar>, StratforgeError>;
}
