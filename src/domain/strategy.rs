//! Canonical strategy specification.
//!
//! `StrategySpec` is what the normalizer produces and what the simulator
//! and renderer consume. It serializes back to the raw wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::condition::{Condition, IndicatorKind};
use crate::domain::indicator::IndicatorType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Timeframe {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

impl Timeframe {
    pub const ALL: [Timeframe; 9] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1M",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// "1m" and "1M" differ only by case, so matching is exact.
impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Timeframe::OneMinute),
            "5m" => Ok(Timeframe::FiveMinutes),
            "15m" => Ok(Timeframe::FifteenMinutes),
            "30m" => Ok(Timeframe::ThirtyMinutes),
            "1h" => Ok(Timeframe::OneHour),
            "4h" => Ok(Timeframe::FourHours),
            "1d" | "daily" => Ok(Timeframe::OneDay),
            "1w" => Ok(Timeframe::OneWeek),
            "1M" => Ok(Timeframe::OneMonth),
            _ => Err(format!("unsupported timeframe '{}'", s)),
        }
    }
}

impl TryFrom<String> for Timeframe {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyManagement {
    pub initial_capital: f64,
    pub position_size_pct: f64,
    pub max_risk_pct: f64,
    pub profit_target_pct: f64,
    pub commission_rate: f64,
    pub max_concurrent_positions: u32,
}

impl Default for MoneyManagement {
    fn default() -> Self {
        MoneyManagement {
            initial_capital: 100_000.0,
            position_size_pct: 10.0,
            max_risk_pct: 2.0,
            profit_target_pct: 5.0,
            commission_rate: 0.001,
            max_concurrent_positions: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub timeframe: Timeframe,
    pub entry_conditions: Vec<Condition>,
    pub exit_conditions: Vec<Condition>,
    pub money_management: MoneyManagement,
    /// Distinct non-constant kinds across all conditions, in canonical order.
    pub indicators_used: Vec<IndicatorKind>,
}

impl StrategySpec {
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.entry_conditions.iter().chain(&self.exit_conditions)
    }

    /// Distinct engine keys referenced by enabled conditions.
    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        let mut types: Vec<IndicatorType> = self
            .conditions()
            .filter(|c| c.enabled)
            .flat_map(|c| [c.left.indicator_type(), c.right.indicator_type()])
            .flatten()
            .collect();
        types.sort();
        types.dedup();
        types
    }

    /// First bar index on which every enabled condition can be decided.
    pub fn warmup(&self) -> usize {
        self.conditions()
            .filter(|c| c.enabled)
            .map(Condition::warmup)
            .max()
            .unwrap_or(0)
    }

    pub fn total_conditions(&self) -> usize {
        self.entry_conditions.len() + self.exit_conditions.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseMetadata {
    pub created_at: DateTime<Utc>,
    pub parser_version: String,
    pub total_conditions: usize,
    pub indicators_count: usize,
}

/// A normalized spec plus bookkeeping that carries no strategy semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedStrategy {
    pub spec: StrategySpec,
    pub warnings: Vec<String>,
    pub metadata: ParseMetadata,
}
