//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_strategy_adapter;
pub mod template_renderer;
