//! Built-in Markdown strategy sheet.

const TEMPLATE: &str = r#"# {{NAME}}

{{DESCRIPTION}}

| Property | Value |
| --- | --- |
| Timeframe | {{TIMEFRAME}} |
| Initial capital | {{CAPITAL}} |
| Position size | {{POSITION_SIZE}} |
| Stop loss | {{STOP_LOSS}} |
| Profit target | {{TARGET}} |
| Commission | {{COMMISSION}} |
| Indicators | {{INDICATORS}} |

## Entry rules

All enabled rules must hold on the same bar.

{{ENTRY_RULES}}

## Exit rules

Any enabled rule closes the position. Stop loss and profit target are checked first.

{{EXIT_RULES}}

_Generated {{GENERATED_AT}}_
"#;

pub fn template() -> &'static str {
    TEMPLATE
}
