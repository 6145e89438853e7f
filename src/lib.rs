//! Macrotrack Library
//!
//! Macro serving accounting, weight and intake history, and the adaptive
//! calorie expenditure estimate.

pub mod build_info;
pub mod config;
pub mod db;
pub mod error;
pub mod expenditure;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod store;
pub mod tools;
pub mod tracker;
