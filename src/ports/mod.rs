//! Port traits at the seams to external collaborators.

pub mod config_port;
pub mod data_port;
pub mod render_port;
