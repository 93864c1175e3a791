//! CLI library components for statmap.

pub mod commands;
pub mod logging;
pub mod types;
