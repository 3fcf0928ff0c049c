//! `{{PLACEHOLDER}}` template rendering of a normalized strategy.
//!
//! Reads a template (either the built-in Markdown sheet or a custom file via
//! `[render] template_path`) and fills every placeholder from the strategy
//! spec alone. Unknown placeholders are an error.

pub mod default_template;

use std::fs;
use std::path::Path;

use crate::domain::condition::Condition;
use crate::domain::error::StratforgeError;
use crate::domain::strategy::ParsedStrategy;
use crate::ports::render_port::RenderPort;

#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    template: String,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            template: default_template::template().to_string(),
        }
    }

    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StratforgeError> {
        let path = path.as_ref();
        let template = fs::read_to_string(path).map_err(|e| StratforgeError::Render {
            reason: format!("failed to read template {}: {}", path.display(), e),
        })?;
        Ok(Self { template })
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPort for TemplateRenderer {
    fn render(&self, strategy: &ParsedStrategy) -> Result<String, StratforgeError> {
        resolve(&self.template, strategy)
    }
}

/// Fill every `{{KEY}}` in `template` in one left-to-right pass.
///
/// Substituted values are copied as-is and never rescanned, so strategy text
/// containing braces comes out literally. An unclosed `{{` is kept as text.
pub fn resolve(template: &str, strategy: &ParsedStrategy) -> Result<String, StratforgeError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        output.push_str(&rest[..start]);
        let key = &rest[start + 2..start + 2 + len];
        let value = placeholder_value(key, strategy).ok_or_else(|| StratforgeError::Render {
            reason: format!("unknown placeholder {{{{{}}}}}", key),
        })?;
        output.push_str(&value);
        rest = &rest[start + 2 + len + 2..];
    }
    output.push_str(rest);
    Ok(output)
}

fn placeholder_value(key: &str, strategy: &ParsedStrategy) -> Option<String> {
    let spec = &strategy.spec;
    let mm = &spec.money_management;

    let value = match key {
        "NAME" => spec.name.clone(),
        "DESCRIPTION" if spec.description.is_empty() => "_No description._".to_string(),
        "DESCRIPTION" => spec.description.clone(),
        "TIMEFRAME" => spec.timeframe.as_str().to_string(),
        "ENTRY_RULES" => render_rules(&spec.entry_conditions),
        "EXIT_RULES" => render_rules(&spec.exit_conditions),
        "INDICATORS" if spec.indicators_used.is_empty() => "none".to_string(),
        "INDICATORS" => spec
            .indicators_used
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        "STOP_LOSS" => format!("{:.2}%", mm.max_risk_pct),
        "TARGET" => format!("{:.2}%", mm.profit_target_pct),
        "CAPITAL" => format!("{:.2}", mm.initial_capital),
        "POSITION_SIZE" => format!("{:.2}%", mm.position_size_pct),
        "COMMISSION" => format!("{:.2}%", mm.commission_rate * 100.0),
        "GENERATED_AT" => strategy
            .metadata
            .created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
        _ => return None,
    };
    Some(value)
}

fn render_rules(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return "_None._".to_string();
    }
    conditions
        .iter()
        .map(|c| {
            if c.enabled {
                format!("- {}", c)
            } else {
                format!("- ~~{}~~ (disabled)", c)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
