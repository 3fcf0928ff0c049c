//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorField`: Which line of a multi-line indicator a condition compares
//! - `IndicatorSeries`: A time series of indicator values aligned to the bar index
//!
//! Every calculation is a pure function of its input bars: the same window
//! always produces bit-identical output.

pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod williams_r;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::ohlcv::{PriceBar, PriceSource};

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Stochastic {
        k: f64,
        d: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorType {
    Rsi {
        period: usize,
        source: PriceSource,
    },
    Sma {
        period: usize,
        source: PriceSource,
    },
    Ema {
        period: usize,
        source: PriceSource,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
        source: PriceSource,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
        source: PriceSource,
    },
    Stochastic {
        k_period: usize,
        d_period: usize,
    },
    WilliamsR(usize),
    Cci(usize),
}

/// Which output line of an indicator is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorField {
    #[default]
    #[serde(rename = "value")]
    Value,
    #[serde(rename = "macd")]
    MacdLine,
    #[serde(rename = "signal")]
    MacdSignal,
    #[serde(rename = "histogram")]
    MacdHistogram,
    #[serde(rename = "k")]
    StochasticK,
    #[serde(rename = "d")]
    StochasticD,
    #[serde(rename = "upper")]
    BollingerUpper,
    #[serde(rename = "middle")]
    BollingerMiddle,
    #[serde(rename = "lower")]
    BollingerLower,
}

impl IndicatorField {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorField::Value => "value",
            IndicatorField::MacdLine => "macd",
            IndicatorField::MacdSignal => "signal",
            IndicatorField::MacdHistogram => "histogram",
            IndicatorField::StochasticK => "k",
            IndicatorField::StochasticD => "d",
            IndicatorField::BollingerUpper => "upper",
            IndicatorField::BollingerMiddle => "middle",
            IndicatorField::BollingerLower => "lower",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Build a single-line series from per-bar optional values.
    pub(crate) fn from_simple(
        indicator_type: IndicatorType,
        bars: &[PriceBar],
        values: Vec<Option<f64>>,
    ) -> Self {
        let values = bars
            .iter()
            .zip(values)
            .map(|(bar, v)| IndicatorPoint {
                timestamp: bar.timestamp,
                valid: v.is_some(),
                value: IndicatorValue::Simple(v.unwrap_or(f64::NAN)),
            })
            .collect();
        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    /// The requested line at `index`, or `None` while it is still warming up.
    pub fn value_at(&self, index: usize, field: IndicatorField) -> Option<f64> {
        let point = self.values.get(index)?;
        if !point.valid {
            return None;
        }
        let v = extract_field(&point.value, field)?;
        v.is_finite().then_some(v)
    }
}

fn extract_field(value: &IndicatorValue, field: IndicatorField) -> Option<f64> {
    match (value, field) {
        (IndicatorValue::Simple(v), IndicatorField::Value) => Some(*v),
        (IndicatorValue::Macd { line, .. }, IndicatorField::MacdLine) => Some(*line),
        (IndicatorValue::Macd { signal, .. }, IndicatorField::MacdSignal) => Some(*signal),
        (IndicatorValue::Macd { histogram, .. }, IndicatorField::MacdHistogram) => Some(*histogram),
        (IndicatorValue::Stochastic { k, .. }, IndicatorField::StochasticK) => Some(*k),
        (IndicatorValue::Stochastic { d, .. }, IndicatorField::StochasticD) => Some(*d),
        (IndicatorValue::Bollinger { upper, .. }, IndicatorField::BollingerUpper) => Some(*upper),
        (IndicatorValue::Bollinger { middle, .. }, IndicatorField::BollingerMiddle) => Some(*middle),
        (IndicatorValue::Bollinger { lower, .. }, IndicatorField::BollingerLower) => Some(*lower),
        _ => None,
    }
}

impl IndicatorType {
    /// Lines this indicator can expose, default first.
    pub fn fields(&self) -> &'static [IndicatorField] {
        match self {
            IndicatorType::Macd { .. } => &[
                IndicatorField::MacdLine,
                IndicatorField::MacdSignal,
                IndicatorField::MacdHistogram,
            ],
            IndicatorType::Bollinger { .. } => &[
                IndicatorField::BollingerMiddle,
                IndicatorField::BollingerUpper,
                IndicatorField::BollingerLower,
            ],
            IndicatorType::Stochastic { .. } => {
                &[IndicatorField::StochasticK, IndicatorField::StochasticD]
            }
            _ => &[IndicatorField::Value],
        }
    }

    /// Number of bars after which `field` is defined on every later bar
    /// (bar index >= warmup).
    pub fn warmup(&self, field: IndicatorField) -> usize {
        match (self, field) {
            (IndicatorType::Rsi { period, .. }, _)
            | (IndicatorType::Sma { period, .. }, _)
            | (IndicatorType::Ema { period, .. }, _)
            | (IndicatorType::Bollinger { period, .. }, _)
            | (IndicatorType::WilliamsR(period), _)
            | (IndicatorType::Cci(period), _) => *period,
            (IndicatorType::Macd { slow, signal, .. }, IndicatorField::MacdSignal)
            | (IndicatorType::Macd { slow, signal, .. }, IndicatorField::MacdHistogram) => {
                (slow + signal).saturating_sub(1)
            }
            (IndicatorType::Macd { fast, slow, .. }, _) => (*fast).max(*slow),
            (
                IndicatorType::Stochastic { k_period, d_period },
                IndicatorField::StochasticD,
            ) => (k_period + d_period).saturating_sub(1),
            (IndicatorType::Stochastic { k_period, .. }, _) => *k_period,
        }
    }
}

fn write_with_source(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    args: String,
    source: PriceSource,
) -> fmt::Result {
    if source == PriceSource::Close {
        write!(f, "{}({})", name, args)
    } else {
        write!(f, "{}({},{})", name, args, source.as_str())
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            IndicatorType::Rsi { period, source } => {
                write_with_source(f, "RSI", period.to_string(), source)
            }
            IndicatorType::Sma { period, source } => {
                write_with_source(f, "SMA", period.to_string(), source)
            }
            IndicatorType::Ema { period, source } => {
                write_with_source(f, "EMA", period.to_string(), source)
            }
            IndicatorType::Macd {
                fast,
                slow,
                signal,
                source,
            } => write_with_source(f, "MACD", format!("{},{},{}", fast, slow, signal), source),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
                source,
            } => {
                let mult = stddev_mult_x100 as f64 / 100.0;
                write_with_source(f, "BOLLINGER", format!("{},{}", period, mult), source)
            }
            IndicatorType::Stochastic { k_period, d_period } => {
                write!(f, "STOCHASTIC({},{})", k_period, d_period)
            }
            IndicatorType::WilliamsR(period) => write!(f, "WILLIAMS_R({})", period),
            IndicatorType::Cci(period) => write!(f, "CCI({})", period),
        }
    }
}

/// Compute one indicator over the full bar series.
pub fn compute(indicator_type: &IndicatorType, bars: &[PriceBar]) -> IndicatorSeries {
    match *indicator_type {
        IndicatorType::Rsi { period, source } => rsi::calculate_rsi(bars, period, source),
        IndicatorType::Sma { period, source } => sma::calculate_sma(bars, period, source),
        IndicatorType::Ema { period, source } => ema::calculate_ema(bars, period, source),
        IndicatorType::Macd {
            fast,
            slow,
            signal,
            source,
        } => macd::calculate_macd(bars, fast, slow, signal, source),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
            source,
        } => bollinger::calculate_bollinger(bars, period, stddev_mult_x100, source),
        IndicatorType::Stochastic { k_period, d_period } => {
            stochastic::calculate_stochastic(bars, k_period, d_period)
        }
        IndicatorType::WilliamsR(period) => williams_r::calculate_williams_r(bars, period),
        IndicatorType::Cci(period) => cci::calculate_cci(bars, period),
    }
}

/// Compute every distinct indicator once.
pub fn compute_indicators(
    bars: &[PriceBar],
    types: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    let mut out = HashMap::with_capacity(types.len());
    for t in types {
        out.entry(*t).or_insert_with(|| compute(t, bars));
    }
    out
}

/// Trailing simple mean; `None` until `period` values are available.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            (i + 1 >= period).then(|| {
                let window = &values[i + 1 - period..=i];
                window.iter().sum::<f64>() / period as f64
            })
        })
        .collect()
}

/// Trailing highest high and lowest low over `period` bars.
pub(crate) fn rolling_extremes(bars: &[PriceBar], period: usize) -> Vec<Option<(f64, f64)>> {
    if period == 0 {
        return vec![None; bars.len()];
    }
    (0..bars.len())
        .map(|i| {
            (i + 1 >= period).then(|| {
                let window = &bars[i + 1 - period..=i];
                let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
                let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
                (highest, lowest)
            })
        })
        .collect()
}
