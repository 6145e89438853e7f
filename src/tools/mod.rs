//! Macrotrack Tools module
//!
//! MCP tool implementations for the macro tracker.

pub mod expenditure;
pub mod intake;
pub mod servings;
pub mod settings;
pub mod status;
pub mod weight;
