//! Domain error types.

/// Top-level error type for stratforge.
#[derive(Debug, thiserror::Error)]
pub enum StratforgeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("strategy parse error in {source_name}: {reason}")]
    SpecParse { source_name: String, reason: String },

    #[error("strategy validation failed: {}", errors.join("; "))]
    SpecInvalid { errors: Vec<String> },

    /// The normalizer was handed a spec that did not pass validation.
    /// This is a caller bug, not bad user input.
    #[error("strategy was not validated before normalization: {reason}")]
    Unvalidated { reason: String },

    #[error("price data error: {reason}")]
    PriceData { reason: String },

    #[error("render error: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratforgeError> for std::process::ExitCode {
    fn from(err: &StratforgeError) -> Self {
        let code: u8 = match err {
            StratforgeError::Io(_) | StratforgeError::Render { .. } => 1,
            StratforgeError::ConfigParse { .. } | StratforgeError::ConfigInvalid { .. } => 2,
            StratforgeError::Unvalidated { .. } => 3,
            StratforgeError::SpecParse { .. } | StratforgeError::SpecInvalid { .. } => 4,
            StratforgeError::PriceData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
