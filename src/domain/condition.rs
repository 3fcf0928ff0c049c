//! Condition data structures.
//!
//! - `IndicatorKind`: which indicator (or a constant) one side of a comparison reads
//! - `IndicatorConfig`: one side of a condition with its parameters
//! - `Operator`: the comparison, including the stateful crossovers
//! - `Condition`: left <operator> right, tagged ENTRY or EXIT
//! - `Operand`: the resolved form the evaluator works with

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::indicator::{bollinger, macd, stochastic, IndicatorField, IndicatorType};
use crate::domain::ohlcv::PriceSource;

/// Declaration order is the canonical order used for `indicators_used`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String")]
pub enum IndicatorKind {
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "SMA")]
    Sma,
    #[serde(rename = "EMA")]
    Ema,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "BOLLINGER")]
    Bollinger,
    #[serde(rename = "STOCHASTIC")]
    Stochastic,
    #[serde(rename = "WILLIAMS_R")]
    WilliamsR,
    #[serde(rename = "CCI")]
    Cci,
    #[serde(rename = "CONSTANT")]
    Constant,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 9] = [
        IndicatorKind::Rsi,
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
        IndicatorKind::Stochastic,
        IndicatorKind::WilliamsR,
        IndicatorKind::Cci,
        IndicatorKind::Constant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::Bollinger => "BOLLINGER",
            IndicatorKind::Stochastic => "STOCHASTIC",
            IndicatorKind::WilliamsR => "WILLIAMS_R",
            IndicatorKind::Cci => "CCI",
            IndicatorKind::Constant => "CONSTANT",
        }
    }

    /// Period used when the raw spec leaves it out.
    pub fn default_period(&self) -> Option<usize> {
        match self {
            IndicatorKind::Rsi => Some(14),
            IndicatorKind::Sma => Some(50),
            IndicatorKind::Ema => Some(20),
            IndicatorKind::Macd => Some(macd::DEFAULT_SLOW),
            IndicatorKind::Bollinger => Some(bollinger::DEFAULT_PERIOD),
            IndicatorKind::Stochastic => Some(stochastic::DEFAULT_K_PERIOD),
            IndicatorKind::WilliamsR => Some(14),
            IndicatorKind::Cci => Some(20),
            IndicatorKind::Constant => None,
        }
    }

    /// Output lines a condition may select, default first.
    pub fn fields(&self) -> &'static [IndicatorField] {
        match self {
            IndicatorKind::Macd => &[
                IndicatorField::MacdLine,
                IndicatorField::MacdSignal,
                IndicatorField::MacdHistogram,
            ],
            IndicatorKind::Bollinger => &[
                IndicatorField::BollingerMiddle,
                IndicatorField::BollingerUpper,
                IndicatorField::BollingerLower,
            ],
            IndicatorKind::Stochastic => {
                &[IndicatorField::StochasticK, IndicatorField::StochasticD]
            }
            _ => &[IndicatorField::Value],
        }
    }

    pub fn default_field(&self) -> IndicatorField {
        self.fields()[0]
    }

    /// Kinds computed from high, low and close rather than one price source.
    pub fn reads_full_bar(&self) -> bool {
        matches!(
            self,
            IndicatorKind::Stochastic | IndicatorKind::WilliamsR | IndicatorKind::Cci
        )
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RSI" => Ok(IndicatorKind::Rsi),
            "SMA" => Ok(IndicatorKind::Sma),
            "EMA" => Ok(IndicatorKind::Ema),
            "MACD" => Ok(IndicatorKind::Macd),
            "BOLLINGER" | "BB" => Ok(IndicatorKind::Bollinger),
            "STOCHASTIC" | "STOCH" => Ok(IndicatorKind::Stochastic),
            "WILLIAMS_R" | "WILLIAMS" => Ok(IndicatorKind::WilliamsR),
            "CCI" => Ok(IndicatorKind::Cci),
            "CONSTANT" | "CUSTOM" => Ok(IndicatorKind::Constant),
            _ => Err(format!("unknown indicator '{}'", s)),
        }
    }
}

impl TryFrom<String> for IndicatorKind {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Operator {
    #[serde(rename = "GT")]
    Gt,
    #[serde(rename = "LT")]
    Lt,
    #[serde(rename = "GTE")]
    Gte,
    #[serde(rename = "LTE")]
    Lte,
    #[serde(rename = "EQ")]
    Eq,
    #[serde(rename = "CROSSES_ABOVE")]
    CrossesAbove,
    #[serde(rename = "CROSSES_BELOW")]
    CrossesBelow,
}

impl Operator {
    pub const ALL: [Operator; 7] = [
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Eq,
        Operator::CrossesAbove,
        Operator::CrossesBelow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gt => "GT",
            Operator::Lt => "LT",
            Operator::Gte => "GTE",
            Operator::Lte => "LTE",
            Operator::Eq => "EQ",
            Operator::CrossesAbove => "CROSSES_ABOVE",
            Operator::CrossesBelow => "CROSSES_BELOW",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Eq => "==",
            Operator::CrossesAbove => "crosses above",
            Operator::CrossesBelow => "crosses below",
        }
    }

    pub fn is_crossover(&self) -> bool {
        matches!(self, Operator::CrossesAbove | Operator::CrossesBelow)
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GT" | "ABOVE" | ">" => Ok(Operator::Gt),
            "LT" | "BELOW" | "<" => Ok(Operator::Lt),
            "GTE" | "GREATER_EQUAL" | ">=" => Ok(Operator::Gte),
            "LTE" | "LESS_EQUAL" | "<=" => Ok(Operator::Lte),
            "EQ" | "EQUAL" | "EQUALS" | "==" => Ok(Operator::Eq),
            "CROSSES_ABOVE" => Ok(Operator::CrossesAbove),
            "CROSSES_BELOW" => Ok(Operator::CrossesBelow),
            _ => Err(format!("unknown operator '{}'", s)),
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Role {
    #[serde(rename = "ENTRY")]
    Entry,
    #[serde(rename = "EXIT")]
    Exit,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Entry => "ENTRY",
            Role::Exit => "EXIT",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENTRY" | "BUY" => Ok(Role::Entry),
            "EXIT" | "SELL" => Ok(Role::Exit),
            _ => Err(format!("unknown role '{}'", s)),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Carried through from the raw spec; conditions are always combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Logic {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl FromStr for Logic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Logic::And),
            "OR" => Ok(Logic::Or),
            _ => Err(format!("unknown logic '{}'", s)),
        }
    }
}

impl TryFrom<String> for Logic {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One side of a condition. After normalization every parameter the kind
/// uses is filled in and the rest are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub kind: IndicatorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<usize>,
    #[serde(default)]
    pub source: PriceSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d_period: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<IndicatorField>,
}

impl IndicatorConfig {
    pub fn constant(value: f64) -> Self {
        IndicatorConfig {
            kind: IndicatorKind::Constant,
            period: None,
            source: PriceSource::Close,
            constant_value: Some(value),
            fast_period: None,
            signal_period: None,
            std_dev: None,
            d_period: None,
            output: None,
        }
    }

    /// An indicator side with every parameter at its default.
    pub fn with_defaults(kind: IndicatorKind) -> Self {
        let mut config = IndicatorConfig {
            kind,
            period: kind.default_period(),
            ..IndicatorConfig::constant(0.0)
        };
        config.constant_value = None;
        match kind {
            IndicatorKind::Constant => {
                config.constant_value = Some(0.0);
                return config;
            }
            IndicatorKind::Macd => {
                config.fast_period = Some(macd::DEFAULT_FAST);
                config.signal_period = Some(macd::DEFAULT_SIGNAL);
            }
            IndicatorKind::Bollinger => config.std_dev = Some(bollinger::DEFAULT_MULTIPLIER),
            IndicatorKind::Stochastic => config.d_period = Some(stochastic::DEFAULT_D_PERIOD),
            _ => {}
        }
        config.output = Some(kind.default_field());
        config
    }

    pub fn is_constant(&self) -> bool {
        self.kind == IndicatorKind::Constant
    }

    /// The engine key for this side, or `None` for a constant.
    pub fn indicator_type(&self) -> Option<IndicatorType> {
        let period = self.period.or(self.kind.default_period())?;
        let source = self.source;
        let t = match self.kind {
            IndicatorKind::Rsi => IndicatorType::Rsi { period, source },
            IndicatorKind::Sma => IndicatorType::Sma { period, source },
            IndicatorKind::Ema => IndicatorType::Ema { period, source },
            IndicatorKind::Macd => IndicatorType::Macd {
                fast: self.fast_period.unwrap_or(macd::DEFAULT_FAST),
                slow: period,
                signal: self.signal_period.unwrap_or(macd::DEFAULT_SIGNAL),
                source,
            },
            IndicatorKind::Bollinger => IndicatorType::Bollinger {
                period,
                stddev_mult_x100: self
                    .std_dev
                    .and_then(bollinger::multiplier_x100)
                    .unwrap_or((bollinger::DEFAULT_MULTIPLIER * 100.0) as u32),
                source,
            },
            IndicatorKind::Stochastic => IndicatorType::Stochastic {
                k_period: period,
                d_period: self.d_period.unwrap_or(stochastic::DEFAULT_D_PERIOD),
            },
            IndicatorKind::WilliamsR => IndicatorType::WilliamsR(period),
            IndicatorKind::Cci => IndicatorType::Cci(period),
            IndicatorKind::Constant => return None,
        };
        Some(t)
    }

    pub fn operand(&self) -> Operand {
        match self.indicator_type() {
            Some(indicator_type) => Operand::Indicator(IndicatorRef {
                indicator_type,
                field: self.output.unwrap_or(self.kind.default_field()),
            }),
            None => Operand::Constant(self.constant_value.unwrap_or(0.0)),
        }
    }
}

impl fmt::Display for IndicatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Indicator(r) if r.field == self.kind.default_field() => {
                write!(f, "{}", r.indicator_type)
            }
            Operand::Indicator(r) => write!(f, "{}.{}", r.indicator_type, r.field.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub role: Role,
    pub left: IndicatorConfig,
    pub operator: Operator,
    pub right: IndicatorConfig,
    pub enabled: bool,
    #[serde(default)]
    pub logic: Logic,
}

impl Condition {
    /// Bars that must pass before both sides are defined.
    pub fn warmup(&self) -> usize {
        self.left.operand().warmup().max(self.right.operand().warmup())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator.symbol(), self.right)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(f64),
    Indicator(IndicatorRef),
}

impl Operand {
    pub fn warmup(&self) -> usize {
        match self {
            Operand::Constant(_) => 0,
            Operand::Indicator(r) => r.indicator_type.warmup(r.field),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRef {
    pub indicator_type: IndicatorType,
    pub field: IndicatorField,
}
