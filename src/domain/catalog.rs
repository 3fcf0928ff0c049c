//! What a strategy document may reference, plus a starter document.
//!
//! The catalog is derived from the domain enums so it cannot drift from
//! what the validator accepts.

use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::condition::{IndicatorKind, Operator};
use crate::domain::condition_eval::EQ_TOLERANCE;
use crate::domain::ohlcv::PriceSource;
use crate::domain::strategy::{MoneyManagement, Timeframe};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorEntry {
    pub kind: &'static str,
    pub default_period: Option<usize>,
    pub fields: Vec<&'static str>,
    /// False for kinds that read high, low and close and ignore `source`.
    pub uses_source: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorEntry {
    pub operator: &'static str,
    pub symbol: &'static str,
    pub crossover: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub indicators: Vec<IndicatorEntry>,
    pub operators: Vec<OperatorEntry>,
    pub timeframes: Vec<&'static str>,
    pub price_sources: Vec<&'static str>,
    pub eq_tolerance: f64,
}

pub fn supported_indicators() -> Vec<IndicatorEntry> {
    IndicatorKind::ALL
        .iter()
        .map(|kind| IndicatorEntry {
            kind: kind.as_str(),
            default_period: kind.default_period(),
            fields: if *kind == IndicatorKind::Constant {
                Vec::new()
            } else {
                kind.fields().iter().map(|f| f.as_str()).collect()
            },
            uses_source: *kind != IndicatorKind::Constant && !kind.reads_full_bar(),
        })
        .collect()
}

pub fn supported_operators() -> Vec<OperatorEntry> {
    Operator::ALL
        .iter()
        .map(|op| OperatorEntry {
            operator: op.as_str(),
            symbol: op.symbol(),
            crossover: op.is_crossover(),
        })
        .collect()
}

pub fn supported_timeframes() -> Vec<&'static str> {
    Timeframe::ALL.iter().map(Timeframe::as_str).collect()
}

pub fn catalog() -> Catalog {
    Catalog {
        indicators: supported_indicators(),
        operators: supported_operators(),
        timeframes: supported_timeframes(),
        price_sources: PriceSource::ALL.iter().map(PriceSource::as_str).collect(),
        eq_tolerance: EQ_TOLERANCE,
    }
}

/// A complete, valid strategy document to start editing from: buy when
/// RSI(14) drops under 30, sell when it rises over 70.
pub fn default_strategy() -> Value {
    let rsi = json!({"kind": "RSI", "period": 14, "source": "close"});
    json!({
        "name": "Default RSI Strategy",
        "description": "Simple RSI-based trading strategy",
        "timeframe": Timeframe::default().as_str(),
        "entry_conditions": [{
            "left": rsi,
            "operator": "LT",
            "right": {"kind": "CONSTANT", "constant_value": 30},
            "logic": "AND",
            "enabled": true
        }],
        "exit_conditions": [{
            "left": rsi,
            "operator": "GT",
            "right": {"kind": "CONSTANT", "constant_value": 70},
            "logic": "AND",
            "enabled": true
        }],
        "money_management": MoneyManagement::default(),
    })
}
