#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{json, Value};
use std::collections::HashMap;
use stratforge::domain::error::StratforgeError;
pub use stratforge::domain::ohlcv::PriceBar;
use stratforge::domain::normalize::normalize;
use stratforge::domain::strategy::StrategySpec;
use stratforge::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, source: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(source.to_string(), bars);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, source: &str) -> Result<Vec<PriceBar>, StratforgeError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(StratforgeError::PriceData {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(source).cloned().unwrap_or_default())
    }
}

pub fn day(offset: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::days(offset as i64)
}

/// One bar per day with open = high = low = close.
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: day(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        })
        .collect()
}

/// Falls 0.5 a bar to 93 at bar 14, then rises 2 a bar.
pub fn dip_then_recover(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            if i <= 14 {
                100.0 - 0.5 * i as f64
            } else {
                93.0 + 2.0 * (i - 14) as f64
            }
        })
        .collect()
}

/// Flat at 100 for 25 bars, then a single jump to 150 that holds.
pub fn step_up(n: usize) -> Vec<f64> {
    (0..n).map(|i| if i < 25 { 100.0 } else { 150.0 }).collect()
}

pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

pub fn indicator(kind: &str, period: usize) -> Value {
    json!({"kind": kind, "period": period})
}

pub fn constant(value: f64) -> Value {
    json!({"kind": "CONSTANT", "constant_value": value})
}

pub fn condition(left: Value, operator: &str, right: Value) -> Value {
    json!({"left": left, "operator": operator, "right": right})
}

pub fn spec_json(name: &str, entry: Vec<Value>, exit: Vec<Value>) -> Value {
    json!({
        "name": name,
        "entry_conditions": entry,
        "exit_conditions": exit,
    })
}

pub fn rsi_dip_json() -> Value {
    spec_json(
        "RSI dip buyer",
        vec![condition(indicator("RSI", 14), "LT", constant(30.0))],
        vec![],
    )
}

pub fn sma_cross_json() -> Value {
    spec_json(
        "SMA Crossover",
        vec![condition(indicator("SMA", 5), "CROSSES_ABOVE", indicator("SMA", 20))],
        vec![],
    )
}

pub fn spec(raw: &Value) -> StrategySpec {
    normalize(raw).unwrap()
}
