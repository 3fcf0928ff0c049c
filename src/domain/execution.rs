//! Trade execution and fill simulation.
//!
//! Fills happen at the bar close. Quantity is whole units only; capital
//! changes only when a position is closed.

use chrono::NaiveDateTime;

use super::portfolio::Portfolio;
use super::position::{Position, Trade, TradeAction, TradeReason};
use super::strategy::MoneyManagement;

/// Commission on a round trip: rate applied to entry and exit notional.
pub fn calculate_commission(quantity: u64, entry_price: f64, exit_price: f64, rate: f64) -> f64 {
    let q = quantity as f64;
    rate * (q * entry_price + q * exit_price)
}

/// Whole units affordable with `position_size_pct` of `capital`.
pub fn position_quantity(capital: f64, position_size_pct: f64, price: f64) -> u64 {
    if price <= 0.0 || !price.is_finite() || capital <= 0.0 {
        return 0;
    }
    let allocation = capital * position_size_pct / 100.0;
    (allocation / price).floor() as u64
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { quantity: u64, price: f64 },
    InsufficientCapital,
}

/// Open a long position at `price`.
///
/// 1. Size the position from current capital
/// 2. If quantity == 0, return InsufficientCapital and stay flat
/// 3. Set stop and target from the entry price
/// 4. Log the BUY
pub fn enter_long(
    portfolio: &mut Portfolio,
    price: f64,
    timestamp: NaiveDateTime,
    mm: &MoneyManagement,
) -> EntryResult {
    let quantity = position_quantity(portfolio.capital, mm.position_size_pct, price);
    if quantity == 0 {
        return EntryResult::InsufficientCapital;
    }

    portfolio.position = Position::open_long(
        price,
        timestamp,
        quantity,
        mm.max_risk_pct,
        mm.profit_target_pct,
    );
    portfolio.record_trade(Trade {
        action: TradeAction::Buy,
        price,
        quantity,
        timestamp,
        pnl_pct: None,
        reason: TradeReason::EntrySignal,
    });

    EntryResult::Entered { quantity, price }
}

/// Close the open long at `price`, realize P&L net of commission, and
/// return the trade's pnl_pct. Returns `None` when flat.
pub fn exit_long(
    portfolio: &mut Portfolio,
    price: f64,
    timestamp: NaiveDateTime,
    reason: TradeReason,
    commission_rate: f64,
) -> Option<f64> {
    if !portfolio.position.is_long() {
        return None;
    }
    let position = std::mem::take(&mut portfolio.position);
    let pnl_pct = position.pnl_pct(price);
    let allocation = position.quantity as f64 * position.entry_price;
    let commission = calculate_commission(
        position.quantity,
        position.entry_price,
        price,
        commission_rate,
    );
    portfolio.capital += allocation * pnl_pct / 100.0 - commission;

    portfolio.record_trade(Trade {
        action: TradeAction::Sell,
        price,
        quantity: position.quantity,
        timestamp,
        pnl_pct: Some(pnl_pct),
        reason,
    });
    Some(pnl_pct)
}

/// Risk exit for `price`: stop-loss first, then target.
pub fn check_risk_exit(position: &Position, price: f64) -> Option<TradeReason> {
    if position.should_stop_loss(price) {
        Some(TradeReason::StopLoss)
    } else if position.should_take_profit(price) {
        Some(TradeReason::Target)
    } else {
        None
    }
}
