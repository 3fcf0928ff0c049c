//! Strategy rendering port trait.

use crate::domain::error::StratforgeError;
use crate::domain::strategy::ParsedStrategy;

/// Turns a normalized strategy into display text. Reads the IR only.
pub trait RenderPort {
    fn render(&self, strategy: &ParsedStrategy) -> Result<String, StratforgeError>;
}
