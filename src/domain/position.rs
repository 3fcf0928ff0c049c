//! Position state and the trade log entries it produces.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionStatus {
    #[default]
    Flat,
    Long,
}

/// The single position a simulation run can hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub status: PositionStatus,
    pub entry_price: f64,
    pub entry_timestamp: Option<NaiveDateTime>,
    pub quantity: u64,
    pub stop_price: f64,
    pub target_price: f64,
}

impl Position {
    pub fn flat() -> Self {
        Position::default()
    }

    pub fn open_long(
        entry_price: f64,
        entry_timestamp: NaiveDateTime,
        quantity: u64,
        max_risk_pct: f64,
        profit_target_pct: f64,
    ) -> Self {
        Position {
            status: PositionStatus::Long,
            entry_price,
            entry_timestamp: Some(entry_timestamp),
            quantity,
            stop_price: entry_price * (1.0 - max_risk_pct / 100.0),
            target_price: entry_price * (1.0 + profit_target_pct / 100.0),
        }
    }

    pub fn is_long(&self) -> bool {
        self.status == PositionStatus::Long
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        self.is_long() && price <= self.stop_price
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        self.is_long() && price >= self.target_price
    }

    /// Percentage move from entry to `exit_price`.
    pub fn pnl_pct(&self, exit_price: f64) -> f64 {
        (exit_price - self.entry_price) / self.entry_price * 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeReason {
    EntrySignal,
    StopLoss,
    Target,
    ExitSignal,
}

impl TradeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeReason::EntrySignal => "ENTRY_SIGNAL",
            TradeReason::StopLoss => "STOP_LOSS",
            TradeReason::Target => "TARGET",
            TradeReason::ExitSignal => "EXIT_SIGNAL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub action: TradeAction,
    pub price: f64,
    pub quantity: u64,
    pub timestamp: NaiveDateTime,
    /// Set on SELL trades only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl_pct: Option<f64>,
    pub reason: TradeReason,
}

impl Trade {
    pub fn is_sell(&self) -> bool {
        self.action == TradeAction::Sell
    }

    pub fn is_win(&self) -> bool {
        self.pnl_pct.is_some_and(|p| p > 0.0)
    }
}
