//! Account state and equity tracking for one simulation run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub capital: f64,
}

/// Realized capital, the open position and everything logged so far.
/// Owned by exactly one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub capital: f64,
    pub initial_capital: f64,
    pub position: Position,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            capital: initial_capital,
            initial_capital,
            position: Position::flat(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    /// Marks the curve at realized capital; open positions are not marked to market.
    pub fn record_equity(&mut self, timestamp: NaiveDateTime) {
        self.equity_curve.push(EquityPoint {
            timestamp,
            capital: self.capital,
        });
    }

    pub fn sells(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.is_sell())
    }
}
