//! Strategy normalization.
//!
//! Turns a validated raw JSON strategy into the canonical `StrategySpec`:
//! defaults filled in, enums resolved, `indicators_used` collected.
//!
//! Default table:
//! - RSI 14, SMA 50, EMA 20, MACD 12/26/9, Bollinger 20/2.0,
//!   Stochastic 14/3, Williams %R 14, CCI 20
//! - timeframe 1d, commission 0.001, position size 10%

use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::domain::condition::{Condition, IndicatorConfig, IndicatorKind, Logic, Operator, Role};
use crate::domain::error::StratforgeError;
use crate::domain::ohlcv::PriceSource;
use crate::domain::strategy::{MoneyManagement, ParseMetadata, ParsedStrategy, StrategySpec, Timeframe};
use crate::domain::validation::{read_count, read_number, read_output, read_period, validate};

pub const PARSER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Normalize a raw spec that has already passed validation.
///
/// Calling this on a spec that fails validation is a caller bug and
/// returns `StratforgeError::Unvalidated`.
pub fn normalize(raw: &Value) -> Result<StrategySpec, StratforgeError> {
    let check = validate(raw);
    if !check.is_valid {
        return Err(StratforgeError::Unvalidated {
            reason: check.errors.join("; "),
        });
    }
    let obj = raw.as_object().ok_or_else(|| unvalidated("strategy is not an object"))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| unvalidated("name is missing"))?;
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let timeframe = match obj.get("timeframe").and_then(Value::as_str) {
        Some(tf) => tf.parse::<Timeframe>().map_err(unvalidated)?,
        None => Timeframe::default(),
    };

    let entry_conditions = normalize_conditions(obj, "entry_conditions", Role::Entry)?;
    let exit_conditions = normalize_conditions(obj, "exit_conditions", Role::Exit)?;
    let money_management = normalize_money_management(obj.get("money_management"));

    let indicators_used: BTreeSet<IndicatorKind> = entry_conditions
        .iter()
        .chain(&exit_conditions)
        .flat_map(|c| [c.left.kind, c.right.kind])
        .filter(|k| *k != IndicatorKind::Constant)
        .collect();

    let spec = StrategySpec {
        name,
        description,
        timeframe,
        entry_conditions,
        exit_conditions,
        money_management,
        indicators_used: indicators_used.into_iter().collect(),
    };

    info!(
        name = %spec.name,
        conditions = spec.total_conditions(),
        indicators = spec.indicators_used.len(),
        "parsed strategy"
    );
    Ok(spec)
}

/// Legacy upgrade, then validation, then normalization.
///
/// Returns the spec and any warnings, or `SpecInvalid` with every error.
pub fn validate_and_normalize(raw: &Value) -> Result<(StrategySpec, Vec<String>), StratforgeError> {
    let upgraded = upgrade_legacy(raw);
    let result = validate(&upgraded);
    if !result.is_valid {
        return Err(StratforgeError::SpecInvalid {
            errors: result.errors,
        });
    }
    let spec = normalize(&upgraded)?;
    Ok((spec, result.warnings))
}

pub fn parse_strategy(raw: &Value) -> Result<ParsedStrategy, StratforgeError> {
    let (spec, warnings) = validate_and_normalize(raw)?;
    let metadata = ParseMetadata {
        created_at: Utc::now(),
        parser_version: PARSER_VERSION.to_string(),
        total_conditions: spec.total_conditions(),
        indicators_count: spec.indicators_used.len(),
    };
    Ok(ParsedStrategy {
        spec,
        warnings,
        metadata,
    })
}

/// Convert the flat single-rule shape into the canonical one.
///
/// `{name, indicator, operator, value, stop_loss, target, capital, period?}`
/// becomes one ENTRY condition against a CONSTANT. Anything that already
/// has `entry_conditions`, or has no `indicator`, is returned unchanged.
pub fn upgrade_legacy(raw: &Value) -> Value {
    let Some(obj) = raw.as_object() else {
        return raw.clone();
    };
    if obj.contains_key("entry_conditions") || !obj.contains_key("indicator") {
        return raw.clone();
    }

    let mut left = Map::new();
    left.insert("kind".into(), obj.get("indicator").cloned().unwrap_or(Value::Null));
    if let Some(period) = obj.get("period") {
        left.insert("period".into(), period.clone());
    }

    let mut upgraded = Map::new();
    for key in ["name", "description", "timeframe"] {
        if let Some(v) = obj.get(key) {
            upgraded.insert(key.into(), v.clone());
        }
    }
    upgraded.insert(
        "entry_conditions".into(),
        json!([{
            "left": Value::Object(left),
            "operator": obj.get("operator").cloned().unwrap_or(Value::Null),
            "right": {"kind": "CONSTANT", "constant_value": obj.get("value").cloned().unwrap_or(Value::Null)},
        }]),
    );
    upgraded.insert("exit_conditions".into(), json!([]));

    let mut mm = Map::new();
    for (legacy, canonical) in [
        ("stop_loss", "max_risk_pct"),
        ("target", "profit_target_pct"),
        ("capital", "initial_capital"),
    ] {
        if let Some(v) = obj.get(legacy) {
            mm.insert(canonical.into(), v.clone());
        }
    }
    upgraded.insert("money_management".into(), Value::Object(mm));
    Value::Object(upgraded)
}

fn unvalidated(reason: impl Into<String>) -> StratforgeError {
    StratforgeError::Unvalidated {
        reason: reason.into(),
    }
}

fn normalize_conditions(
    obj: &Map<String, Value>,
    key: &str,
    role: Role,
) -> Result<Vec<Condition>, StratforgeError> {
    let Some(list) = obj.get(key).and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    list.iter()
        .map(|raw| normalize_condition(raw, role))
        .collect()
}

fn normalize_condition(raw: &Value, role: Role) -> Result<Condition, StratforgeError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| unvalidated("condition is not an object"))?;
    let operator = obj
        .get("operator")
        .and_then(Value::as_str)
        .ok_or_else(|| unvalidated("operator is missing"))?
        .parse::<Operator>()
        .map_err(unvalidated)?;
    let logic = match obj.get("logic").and_then(Value::as_str) {
        Some(l) => l.parse::<Logic>().map_err(unvalidated)?,
        None => Logic::And,
    };
    Ok(Condition {
        role,
        left: normalize_side(obj.get("left"))?,
        operator,
        right: normalize_side(obj.get("right"))?,
        enabled: obj.get("enabled").and_then(Value::as_bool).unwrap_or(true),
        logic,
    })
}

fn normalize_side(raw: Option<&Value>) -> Result<IndicatorConfig, StratforgeError> {
    let obj = raw
        .and_then(Value::as_object)
        .ok_or_else(|| unvalidated("condition side is not an object"))?;
    let kind = obj
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| unvalidated("indicator kind is missing"))?
        .parse::<IndicatorKind>()
        .map_err(unvalidated)?;

    if kind == IndicatorKind::Constant {
        let value = obj
            .get("constant_value")
            .and_then(read_number)
            .ok_or_else(|| unvalidated("constant_value is missing"))?;
        return Ok(IndicatorConfig::constant(value));
    }

    let mut config = IndicatorConfig::with_defaults(kind);
    let param = |key: &str| obj.get(key).filter(|v| !v.is_null());

    if let Some(p) = param("period").and_then(read_period) {
        config.period = Some(p);
    }
    if let Some(source) = param("source").and_then(Value::as_str) {
        config.source = serde_json::from_value::<PriceSource>(Value::String(source.to_string()))
            .map_err(|e| unvalidated(e.to_string()))?;
    }
    if let Some(output) = param("output").and_then(read_output) {
        config.output = Some(output);
    }
    match kind {
        IndicatorKind::Macd => {
            if let Some(p) = param("fast_period").and_then(read_period) {
                config.fast_period = Some(p);
            }
            if let Some(p) = param("signal_period").and_then(read_period) {
                config.signal_period = Some(p);
            }
        }
        IndicatorKind::Bollinger => {
            if let Some(sd) = param("std_dev").and_then(read_number) {
                config.std_dev = Some(sd);
            }
        }
        IndicatorKind::Stochastic => {
            if let Some(p) = param("d_period").and_then(read_period) {
                config.d_period = Some(p);
            }
        }
        _ => {}
    }
    Ok(config)
}

fn normalize_money_management(raw: Option<&Value>) -> MoneyManagement {
    let mut mm = MoneyManagement::default();
    let Some(obj) = raw.and_then(Value::as_object) else {
        return mm;
    };
    let number = |key: &str| obj.get(key).and_then(read_number);

    if let Some(v) = number("initial_capital") {
        mm.initial_capital = v;
    }
    if let Some(v) = number("position_size_pct") {
        mm.position_size_pct = v;
    }
    if let Some(v) = number("max_risk_pct") {
        mm.max_risk_pct = v;
    }
    if let Some(v) = number("profit_target_pct") {
        mm.profit_target_pct = v;
    }
    if let Some(v) = number("commission_rate") {
        mm.commission_rate = v;
    }
    if let Some(v) = obj.get("max_concurrent_positions").and_then(read_count) {
        mm.max_concurrent_positions = u32::try_from(v).unwrap_or(u32::MAX);
    }
    mm
}
