//! Strategy specification validation.
//!
//! Checks a raw JSON strategy against structural and range rules. Every
//! failure is collected so the user sees all problems at once; nothing
//! here returns `Err` or panics on malformed input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::condition::{IndicatorKind, Logic, Operator, Role};
use crate::domain::indicator::{bollinger, macd, IndicatorField};
use crate::domain::ohlcv::PriceSource;
use crate::domain::strategy::Timeframe;

pub const MAX_PERIOD: usize = 200;
pub const MAX_CONDITIONS: usize = 10;
pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: ValidationSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub entry_conditions_count: usize,
    pub exit_conditions_count: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
}

pub fn validate(raw: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let list_len = |key: &str| raw.get(key).and_then(Value::as_array).map_or(0, Vec::len);
    match raw.as_object() {
        Some(obj) => {
            validate_name(obj, &mut errors);
            validate_condition_lists(obj, &mut errors, &mut warnings);
            validate_timeframe(obj, &mut errors);
            validate_money_management(obj, &mut errors, &mut warnings);
        }
        None => errors.push("Strategy must be a JSON object".to_string()),
    }

    let summary = ValidationSummary {
        entry_conditions_count: list_len("entry_conditions"),
        exit_conditions_count: list_len("exit_conditions"),
        total_errors: errors.len(),
        total_warnings: warnings.len(),
    };
    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        summary,
    }
}

/// A positive whole number, accepting `14` and `14.0`.
pub(crate) fn read_count(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok().filter(|n| *n > 0);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f > 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as usize)
}

pub(crate) fn read_period(value: &Value) -> Option<usize> {
    read_count(value).filter(|p| *p <= MAX_PERIOD)
}

pub(crate) fn read_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|f| f.is_finite())
}

pub(crate) fn read_output(value: &Value) -> Option<IndicatorField> {
    IndicatorField::deserialize(value).ok()
}

fn validate_name(obj: &Map<String, Value>, errors: &mut Vec<String>) {
    let name = match obj.get("name") {
        Some(Value::String(s)) => s.trim(),
        Some(Value::Null) | None => "",
        Some(_) => {
            errors.push("Strategy name must be a string".to_string());
            return;
        }
    };
    let len = name.chars().count();
    if len == 0 {
        errors.push("Strategy name is required".to_string());
    } else if len < NAME_MIN_LEN {
        errors.push(format!(
            "Strategy name must be at least {} characters long",
            NAME_MIN_LEN
        ));
    } else if len > NAME_MAX_LEN {
        errors.push(format!(
            "Strategy name must be at most {} characters long",
            NAME_MAX_LEN
        ));
    }
}

fn validate_condition_lists(
    obj: &Map<String, Value>,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    match obj.get("entry_conditions") {
        None | Some(Value::Null) => {
            errors.push("At least one entry condition is required".to_string())
        }
        Some(Value::Array(list)) => {
            if list.is_empty() {
                errors.push("At least one entry condition is required".to_string());
            } else if list.len() > MAX_CONDITIONS {
                warnings.push(format!(
                    "More than {} entry conditions may impact performance",
                    MAX_CONDITIONS
                ));
            }
            let mut all_disabled = !list.is_empty();
            for (i, cond) in list.iter().enumerate() {
                let location = format!("Entry condition {}", i + 1);
                if validate_condition(&location, Role::Entry, cond, errors, warnings) {
                    all_disabled = false;
                }
            }
            if all_disabled {
                warnings.push(
                    "All entry conditions are disabled; the strategy will never enter".to_string(),
                );
            }
        }
        Some(_) => errors.push("Entry conditions must be a list".to_string()),
    }

    match obj.get("exit_conditions") {
        None | Some(Value::Null) => warnings.push(
            "No exit conditions defined - using default stop loss/take profit".to_string(),
        ),
        Some(Value::Array(list)) => {
            if list.is_empty() {
                warnings.push(
                    "No exit conditions defined - using default stop loss/take profit".to_string(),
                );
            } else if list.len() > MAX_CONDITIONS {
                warnings.push(format!(
                    "More than {} exit conditions may impact performance",
                    MAX_CONDITIONS
                ));
            }
            for (i, cond) in list.iter().enumerate() {
                let location = format!("Exit condition {}", i + 1);
                validate_condition(&location, Role::Exit, cond, errors, warnings);
            }
        }
        Some(_) => errors.push("Exit conditions must be a list".to_string()),
    }
}

/// Returns whether the condition is enabled.
fn validate_condition(
    location: &str,
    expected_role: Role,
    value: &Value,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> bool {
    let Some(cond) = value.as_object() else {
        errors.push(format!("{}: Must be an object", location));
        return false;
    };

    if let Some(role) = cond.get("role").filter(|v| !v.is_null()) {
        match role.as_str().map(str::parse::<Role>) {
            Some(Ok(role)) if role == expected_role => {}
            Some(Ok(role)) => errors.push(format!(
                "{}: Role {} does not match the list it appears in",
                location,
                role.as_str()
            )),
            _ => errors.push(format!("{}: Unsupported role {}", location, role)),
        }
    }

    let left = validate_side(location, "Left", cond.get("left"), errors, warnings);
    let right = validate_side(location, "Right", cond.get("right"), errors, warnings);

    let operator = match cond.get("operator") {
        None | Some(Value::Null) => {
            errors.push(format!("{}: Operator is required", location));
            None
        }
        Some(op) => match op.as_str().map(str::parse::<Operator>) {
            Some(Ok(op)) => Some(op),
            _ => {
                errors.push(format!("{}: Unsupported operator {}", location, op));
                None
            }
        },
    };

    if let (Some(op), Some(IndicatorKind::Constant), Some(IndicatorKind::Constant)) =
        (operator, left, right)
    {
        if op.is_crossover() {
            errors.push(format!(
                "{}: {} cannot compare two CONSTANT values",
                location,
                op.as_str()
            ));
        }
    }

    let enabled = match cond.get("enabled") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            errors.push(format!("{}: enabled must be true or false", location));
            true
        }
    };

    if let Some(logic) = cond.get("logic").filter(|v| !v.is_null()) {
        match logic.as_str().map(str::parse::<Logic>) {
            Some(Ok(Logic::And)) => {}
            Some(Ok(Logic::Or)) => warnings.push(format!(
                "{}: logic 'OR' is not supported; conditions are combined with AND",
                location
            )),
            _ => errors.push(format!("{}: Unsupported logic {}", location, logic)),
        }
    }

    enabled
}

/// Validates one side and returns its kind when recognized.
fn validate_side(
    location: &str,
    side: &str,
    value: Option<&Value>,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) -> Option<IndicatorKind> {
    let lower = side.to_ascii_lowercase();
    let Some(obj) = value.and_then(Value::as_object) else {
        errors.push(format!("{}: {} side must be an object", location, side));
        return None;
    };

    let kind = match obj.get("kind") {
        None | Some(Value::Null) => {
            errors.push(format!("{}: {} indicator is required", location, side));
            return None;
        }
        Some(k) => match k.as_str().map(str::parse::<IndicatorKind>) {
            Some(Ok(kind)) => kind,
            _ => {
                errors.push(format!(
                    "{}: Unsupported {} indicator {}",
                    location, lower, k
                ));
                return None;
            }
        },
    };

    if let Some(source) = obj.get("source").filter(|v| !v.is_null()) {
        match PriceSource::deserialize(source) {
            Err(_) => errors.push(format!(
                "{}: {} source {} is not one of open, high, low, close",
                location, side, source
            )),
            Ok(s) if s != PriceSource::Close && kind.reads_full_bar() => warnings.push(format!(
                "{}: {} source {} is ignored; {} reads high, low and close",
                location,
                side,
                s.as_str(),
                kind
            )),
            Ok(_) => {}
        }
    }

    if kind == IndicatorKind::Constant {
        match obj.get("constant_value") {
            None | Some(Value::Null) => errors.push(format!(
                "{}: Constant value is required for CONSTANT indicator",
                location
            )),
            Some(v) if read_number(v).is_none() => {
                errors.push(format!("{}: Constant value must be a number", location))
            }
            Some(_) => {}
        }
        return Some(kind);
    }

    if obj.get("constant_value").is_some_and(|v| !v.is_null()) {
        errors.push(format!(
            "{}: {} constant_value is only allowed on CONSTANT indicators",
            location, side
        ));
    }

    let period = check_period(location, side, obj, "period", errors);
    match kind {
        IndicatorKind::Macd => {
            let fast = check_period(location, side, obj, "fast_period", errors);
            check_period(location, side, obj, "signal_period", errors);
            let slow = period.or(kind.default_period());
            let fast = fast.or(Some(macd::DEFAULT_FAST));
            if let (Some(fast), Some(slow)) = (fast, slow) {
                if fast >= slow {
                    errors.push(format!(
                        "{}: {} MACD fast_period must be less than period",
                        location, side
                    ));
                }
            }
        }
        IndicatorKind::Bollinger => {
            if let Some(sd) = obj.get("std_dev").filter(|v| !v.is_null()) {
                if read_number(sd).and_then(bollinger::multiplier_x100).is_none() {
                    errors.push(format!(
                        "{}: {} std_dev must be above 0 and at most {} with no more than 2 decimals",
                        location,
                        side,
                        bollinger::MAX_MULTIPLIER
                    ));
                }
            }
        }
        IndicatorKind::Stochastic => {
            check_period(location, side, obj, "d_period", errors);
        }
        _ => {}
    }

    if let Some(output) = obj.get("output").filter(|v| !v.is_null()) {
        let known = read_output(output).is_some_and(|f| kind.fields().contains(&f));
        if !known {
            errors.push(format!(
                "{}: {} output {} is not available for {}",
                location, side, output, kind
            ));
        }
    }

    Some(kind)
}

/// Checks an optional period-like key; returns it when present and valid.
fn check_period(
    location: &str,
    side: &str,
    obj: &Map<String, Value>,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<usize> {
    let value = obj.get(key).filter(|v| !v.is_null())?;
    let period = read_period(value);
    if period.is_none() {
        errors.push(format!(
            "{}: {} {} must be a positive integer no greater than {}",
            location, side, key, MAX_PERIOD
        ));
    }
    period
}

fn validate_timeframe(obj: &Map<String, Value>, errors: &mut Vec<String>) {
    if let Some(tf) = obj.get("timeframe").filter(|v| !v.is_null()) {
        if !tf.as_str().is_some_and(|s| s.parse::<Timeframe>().is_ok()) {
            errors.push(format!("Unsupported timeframe: {}", display_value(tf)));
        }
    }
}

fn validate_money_management(
    obj: &Map<String, Value>,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let mm = match obj.get("money_management") {
        None | Some(Value::Null) => return,
        Some(Value::Object(mm)) => mm,
        Some(_) => {
            errors.push("Money management must be an object".to_string());
            return;
        }
    };

    let field = |key: &str| mm.get(key).filter(|v| !v.is_null());

    if let Some(v) = field("position_size_pct") {
        if !read_number(v).is_some_and(|p| p > 0.0 && p <= 100.0) {
            errors.push("Position size must be between 0 and 100".to_string());
        }
    }
    if let Some(v) = field("max_risk_pct") {
        if !read_number(v).is_some_and(|p| p > 0.0 && p <= 100.0) {
            errors.push("Max risk must be between 0 and 100".to_string());
        }
    }
    if let Some(v) = field("profit_target_pct") {
        if !read_number(v).is_some_and(|p| p > 0.0) {
            errors.push("Profit target must be a positive number".to_string());
        }
    }
    if let Some(v) = field("commission_rate") {
        if !read_number(v).is_some_and(|c| (0.0..1.0).contains(&c)) {
            errors.push("Commission rate must be at least 0 and below 1".to_string());
        }
    }
    if let Some(v) = field("initial_capital") {
        if !read_number(v).is_some_and(|c| c > 0.0) {
            errors.push("Initial capital must be a positive number".to_string());
        }
    }
    if let Some(v) = field("max_concurrent_positions") {
        match read_count(v) {
            Some(1) => {}
            Some(_) => warnings.push(
                "Only one position is simulated at a time; max_concurrent_positions above 1 is ignored"
                    .to_string(),
            ),
            None => errors.push("Max concurrent positions must be a whole number of at least 1".to_string()),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rsi_entry() -> Value {
        json!({
            "left": {"kind": "RSI", "period": 14},
            "operator": "LT",
            "right": {"kind": "CONSTANT", "constant_value": 30}
        })
    }

    fn valid_spec() -> Value {
        json!({
            "name": "RSI dip buyer",
            "timeframe": "1d",
            "entry_conditions": [rsi_entry()],
            "exit_conditions": [{
                "left": {"kind": "RSI", "period": 14},
                "operator": "GT",
                "right": {"kind": "CONSTANT", "constant_value": 70}
            }],
            "money_management": {
                "initial_capital": 100000,
                "position_size_pct": 10,
                "max_risk_pct": 2,
                "profit_target_pct": 5,
                "commission_rate": 0.001
            }
        })
    }

    fn with(mut spec: Value, path: &[&str], value: Value) -> Value {
        let mut target = &mut spec;
        for key in path {
            target = match key.parse::<usize>() {
                Ok(i) => &mut target[i],
                Err(_) => &mut target[*key],
            };
        }
        *target = value;
        spec
    }

    #[test]
    fn valid_spec_passes() {
        let result = validate(&valid_spec());
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn non_object_is_single_error() {
        let result = validate(&json!([1, 2, 3]));
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Strategy must be a JSON object"]);
    }

    #[test]
    fn missing_name_and_bad_stop_are_two_errors() {
        let mut spec = with(valid_spec(), &["money_management", "max_risk_pct"], json!(150));
        spec.as_object_mut().unwrap().remove("name");
        let result = validate(&spec);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2, "{:?}", result.errors);
        assert_eq!(result.errors[0], "Strategy name is required");
        assert_eq!(result.errors[1], "Max risk must be between 0 and 100");
    }

    #[test]
    fn name_length_bounds() {
        let short = validate(&with(valid_spec(), &["name"], json!("ab")));
        assert_eq!(short.errors, vec!["Strategy name must be at least 3 characters long"]);
        let long = validate(&with(valid_spec(), &["name"], json!("x".repeat(101))));
        assert_eq!(long.errors, vec!["Strategy name must be at most 100 characters long"]);
        assert!(validate(&with(valid_spec(), &["name"], json!("x".repeat(100)))).is_valid);
    }

    #[test]
    fn empty_entry_conditions_is_error() {
        let result = validate(&with(valid_spec(), &["entry_conditions"], json!([])));
        assert_eq!(result.errors, vec!["At least one entry condition is required"]);
    }

    #[test]
    fn too_many_conditions_is_warning() {
        let many: Vec<Value> = (0..11).map(|_| rsi_entry()).collect();
        let result = validate(&with(valid_spec(), &["entry_conditions"], json!(many)));
        assert!(result.is_valid);
        assert_eq!(
            result.warnings,
            vec!["More than 10 entry conditions may impact performance"]
        );
    }

    #[test]
    fn missing_exit_conditions_is_warning() {
        let mut spec = valid_spec();
        spec.as_object_mut().unwrap().remove("exit_conditions");
        let result = validate(&spec);
        assert!(result.is_valid);
        assert_eq!(
            result.warnings,
            vec!["No exit conditions defined - using default stop loss/take profit"]
        );
    }

    #[test]
    fn unknown_indicator_and_operator() {
        let spec = with(valid_spec(), &["entry_conditions", "0", "left", "kind"], json!("VWAP"));
        let spec = with(spec, &["entry_conditions", "0", "operator"], json!("BETWEEN"));
        let result = validate(&spec);
        assert_eq!(result.errors.len(), 2, "{:?}", result.errors);
        assert!(result.errors[0].starts_with("Entry condition 1: Unsupported left indicator"));
        assert!(result.errors[1].starts_with("Entry condition 1: Unsupported operator"));
    }

    #[test]
    fn period_range() {
        for bad in [json!(0), json!(201), json!(-3), json!(2.5), json!("14")] {
            let spec = with(
                valid_spec(),
                &["exit_conditions", "0", "left", "period"],
                bad.clone(),
            );
            let result = validate(&spec);
            assert_eq!(result.errors.len(), 1, "period {} gave {:?}", bad, result.errors);
            assert!(result.errors[0].starts_with("Exit condition 1: Left period"));
        }
        let ok = with(valid_spec(), &["exit_conditions", "0", "left", "period"], json!(200));
        assert!(validate(&ok).is_valid);
    }

    #[test]
    fn constant_requires_numeric_value() {
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "right"],
            json!({"kind": "CONSTANT"}),
        );
        let result = validate(&spec);
        assert_eq!(
            result.errors,
            vec!["Entry condition 1: Constant value is required for CONSTANT indicator"]
        );

        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "right", "constant_value"],
            json!("thirty"),
        );
        assert_eq!(
            validate(&spec).errors,
            vec!["Entry condition 1: Constant value must be a number"]
        );
    }

    #[test]
    fn constant_value_forbidden_on_indicator() {
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "left", "constant_value"],
            json!(5),
        );
        let result = validate(&spec);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("constant_value is only allowed on CONSTANT"));
    }

    #[test]
    fn crossing_two_constants_rejected() {
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0"],
            json!({
                "left": {"kind": "CONSTANT", "constant_value": 1},
                "operator": "CROSSES_ABOVE",
                "right": {"kind": "CONSTANT", "constant_value": 2}
            }),
        );
        assert_eq!(
            validate(&spec).errors,
            vec!["Entry condition 1: CROSSES_ABOVE cannot compare two CONSTANT values"]
        );
    }

    #[test]
    fn comparing_two_constants_allowed() {
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0"],
            json!({
                "left": {"kind": "CONSTANT", "constant_value": 1},
                "operator": "GT",
                "right": {"kind": "CONSTANT", "constant_value": 2}
            }),
        );
        assert!(validate(&spec).is_valid);
    }

    #[test]
    fn unsupported_timeframe() {
        let result = validate(&with(valid_spec(), &["timeframe"], json!("2d")));
        assert_eq!(result.errors, vec!["Unsupported timeframe: 2d"]);
        assert!(validate(&with(valid_spec(), &["timeframe"], json!("daily"))).is_valid);
    }

    #[test]
    fn money_management_ranges() {
        let spec = with(valid_spec(), &["money_management"], json!({
            "initial_capital": 0,
            "position_size_pct": 120,
            "max_risk_pct": 0,
            "profit_target_pct": -1,
            "commission_rate": 1.0,
            "max_concurrent_positions": 0
        }));
        let result = validate(&spec);
        assert_eq!(result.errors.len(), 6, "{:?}", result.errors);
    }

    #[test]
    fn concurrent_positions_above_one_warns() {
        let spec = with(
            valid_spec(),
            &["money_management", "max_concurrent_positions"],
            json!(3),
        );
        let result = validate(&spec);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn logic_or_warns() {
        let spec = with(valid_spec(), &["entry_conditions", "0", "logic"], json!("OR"));
        let result = validate(&spec);
        assert!(result.is_valid);
        assert_eq!(
            result.warnings,
            vec!["Entry condition 1: logic 'OR' is not supported; conditions are combined with AND"]
        );
    }

    #[test]
    fn all_entries_disabled_warns() {
        let spec = with(valid_spec(), &["entry_conditions", "0", "enabled"], json!(false));
        let result = validate(&spec);
        assert!(result.is_valid);
        assert_eq!(
            result.warnings,
            vec!["All entry conditions are disabled; the strategy will never enter"]
        );
    }

    #[test]
    fn role_mismatch() {
        let spec = with(valid_spec(), &["exit_conditions", "0", "role"], json!("ENTRY"));
        assert_eq!(
            validate(&spec).errors,
            vec!["Exit condition 1: Role ENTRY does not match the list it appears in"]
        );
    }

    #[test]
    fn macd_and_bollinger_parameters() {
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "left"],
            json!({"kind": "MACD", "period": 10, "fast_period": 12}),
        );
        assert_eq!(
            validate(&spec).errors,
            vec!["Entry condition 1: Left MACD fast_period must be less than period"]
        );

        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "left"],
            json!({"kind": "BB", "std_dev": 0, "output": "upper"}),
        );
        assert_eq!(
            validate(&spec).errors,
            vec!["Entry condition 1: Left std_dev must be above 0 and at most 10 with no more than 2 decimals"]
        );
    }

    #[test]
    fn output_must_match_kind() {
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "left", "output"],
            json!("upper"),
        );
        let result = validate(&spec);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("output \"upper\" is not available for RSI"));
    }

    #[test]
    fn errors_accumulate_across_sections() {
        let spec = json!({
            "name": "x",
            "entry_conditions": "not a list",
            "timeframe": "3d",
            "money_management": {"position_size_pct": 0}
        });
        let result = validate(&spec);
        assert_eq!(result.errors.len(), 4, "{:?}", result.errors);
    }

    #[test]
    fn read_period_accepts_whole_floats() {
        assert_eq!(read_period(&json!(14.0)), Some(14));
        assert_eq!(read_period(&json!(14.5)), None);
        assert_eq!(read_period(&json!(0)), None);
        assert_eq!(read_period(&json!(201)), None);
    }

    #[test]
    fn summary_counts_conditions_and_findings() {
        let mut spec = with(valid_spec(), &["money_management", "max_risk_pct"], json!(150));
        spec.as_object_mut().unwrap().remove("name");
        let summary = validate(&spec).summary;
        assert_eq!(
            summary,
            ValidationSummary {
                entry_conditions_count: 1,
                exit_conditions_count: 1,
                total_errors: 2,
                total_warnings: 0,
            }
        );
        assert_eq!(validate(&json!("nope")).summary.total_errors, 1);
    }

    #[test]
    fn bollinger_multiplier_must_survive_two_decimals() {
        for sd in [json!(0.004), json!(2.345), json!(10.5)] {
            let spec = with(
                valid_spec(),
                &["entry_conditions", "0", "left"],
                json!({"kind": "BOLLINGER", "period": 5, "std_dev": sd, "output": "upper"}),
            );
            assert_eq!(validate(&spec).errors.len(), 1, "std_dev {sd}");
        }
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "left"],
            json!({"kind": "BOLLINGER", "period": 5, "std_dev": 2.35, "output": "upper"}),
        );
        assert!(validate(&spec).is_valid);
    }

    #[test]
    fn source_on_full_bar_kinds_warns() {
        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "left"],
            json!({"kind": "CCI", "period": 20, "source": "open"}),
        );
        let result = validate(&spec);
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(
            result.warnings,
            vec!["Entry condition 1: Left source open is ignored; CCI reads high, low and close"]
        );

        let spec = with(
            valid_spec(),
            &["entry_conditions", "0", "left"],
            json!({"kind": "STOCH", "source": "close"}),
        );
        assert!(validate(&spec).warnings.is_empty());
    }
}
