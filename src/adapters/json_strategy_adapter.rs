//! JSON strategy file loading.
//!
//! Produces the raw document only; validation and normalization happen in
//! the domain.

use crate::domain::error::StratforgeError;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub fn load_strategy<P: AsRef<Path>>(path: P) -> Result<Value, StratforgeError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse_strategy_str(&content, &path.display().to_string())
}

pub fn parse_strategy_str(content: &str, source_name: &str) -> Result<Value, StratforgeError> {
    serde_json::from_str(content).map_err(|e| StratforgeError::SpecParse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })
}
