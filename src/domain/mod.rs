//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod condition;
pub mod condition_eval;
pub mod strategy;
pub mod validation;
pub mod normalize;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod batch;
pub mod catalog;
pub mod error;
