//! Adaptive expenditure estimate
//!
//! Weight trend regression and the recompute formula built on it.

pub mod recompute;
pub mod regression;

pub use recompute::{
    compute_expenditure, ensure_enough_weights, window_start, RecomputeParams, RecomputePhase,
    Recomputation, DEFAULT_MAX_STEP_KCAL, DEFAULT_WINDOW_DAYS, KCAL_PER_LB_PER_WEEK,
};
pub use regression::{day_offset, weight_trend, TrendLine, WeightTrend};
