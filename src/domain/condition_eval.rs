//! Condition evaluation engine.
//!
//! Evaluates conditions against pre-computed indicator series.
//!
//! # Evaluation Semantics
//!
//! - `GT`/`LT`/`GTE`/`LTE`: compare current left and right values
//! - `EQ`: equal within an absolute tolerance of 0.01
//! - `CROSSES_ABOVE`: `left_prev <= right_prev && left_now > right_now`
//! - `CROSSES_BELOW`: `left_prev >= right_prev && left_now < right_now`
//! - Any undefined value involved makes the condition false
//! - Entry: every enabled ENTRY condition holds on the same bar
//! - Exit: any enabled EXIT condition holds

use std::collections::HashMap;

use crate::domain::condition::{Condition, Operand, Operator};
use crate::domain::indicator::{IndicatorSeries, IndicatorType};

pub const EQ_TOLERANCE: f64 = 1e-2;
/// Absorbs f64 error so values exactly `EQ_TOLERANCE` apart still compare equal.
const EQ_SLACK: f64 = 1e-9;

/// Left and right values of a condition on one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Snapshot {
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl Snapshot {
    pub fn new(left: f64, right: f64) -> Self {
        Snapshot {
            left: Some(left),
            right: Some(right),
        }
    }
}

pub fn evaluate(condition: &Condition, now: Snapshot, prev: Snapshot) -> bool {
    compare(condition.operator, now, prev)
}

pub fn compare(operator: Operator, now: Snapshot, prev: Snapshot) -> bool {
    let (Some(left), Some(right)) = (now.left, now.right) else {
        return false;
    };
    match operator {
        Operator::Gt => left > right,
        Operator::Lt => left < right,
        Operator::Gte => left >= right,
        Operator::Lte => left <= right,
        Operator::Eq => (left - right).abs() <= EQ_TOLERANCE + EQ_SLACK,
        Operator::CrossesAbove | Operator::CrossesBelow => {
            let (Some(left_prev), Some(right_prev)) = (prev.left, prev.right) else {
                return false;
            };
            if operator == Operator::CrossesAbove {
                left_prev <= right_prev && left > right
            } else {
                left_prev >= right_prev && left < right
            }
        }
    }
}

pub fn resolve_operand(
    operand: &Operand,
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> Option<f64> {
    match operand {
        Operand::Constant(v) => v.is_finite().then_some(*v),
        Operand::Indicator(r) => indicators
            .get(&r.indicator_type)?
            .value_at(bar_index, r.field),
    }
}

pub fn snapshot_at(
    condition: &Condition,
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> Snapshot {
    Snapshot {
        left: resolve_operand(&condition.left.operand(), indicators, bar_index),
        right: resolve_operand(&condition.right.operand(), indicators, bar_index),
    }
}

/// Evaluate `condition` at `bar_index`, reading the previous bar for crossovers.
pub fn evaluate_at(
    condition: &Condition,
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> bool {
    let now = snapshot_at(condition, indicators, bar_index);
    let prev = match bar_index.checked_sub(1) {
        Some(i) if condition.operator.is_crossover() => snapshot_at(condition, indicators, i),
        _ => Snapshot::default(),
    };
    evaluate(condition, now, prev)
}

/// True when at least one ENTRY condition is enabled and all enabled ones hold.
pub fn entry_signal(
    conditions: &[Condition],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> bool {
    let mut enabled = conditions.iter().filter(|c| c.enabled).peekable();
    if enabled.peek().is_none() {
        return false;
    }
    enabled.all(|c| evaluate_at(c, indicators, bar_index))
}

/// True when any enabled EXIT condition holds.
pub fn exit_signal(
    conditions: &[Condition],
    indicators: &HashMap<IndicatorType, IndicatorSeries>,
    bar_index: usize,
) -> bool {
    conditions
        .iter()
        .filter(|c| c.enabled)
        .any(|c| evaluate_at(c, indicators, bar_index))
}
