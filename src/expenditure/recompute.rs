//! Expenditure recompute
//!
//! Adjusts the expenditure estimate from the fitted weight trend and the
//! intake logged over the same trailing window.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::regression::weight_trend;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{IntakeRecord, WeightSample};
use crate::nutrition::{calories_from_grams, ServingConfig};

/// Energy equivalent of 1 lb per week, in kcal per day
pub const KCAL_PER_LB_PER_WEEK: f64 = 500.0;

pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Largest step applied in a single recompute
pub const DEFAULT_MAX_STEP_KCAL: f64 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecomputeParams {
    pub window_days: u32,
    /// `None` applies the full half-adjustment
    pub max_step_kcal: Option<f64>,
}

impl Default for RecomputeParams {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            max_step_kcal: Some(DEFAULT_MAX_STEP_KCAL),
        }
    }
}

impl RecomputeParams {
    pub fn with_window(window_days: u32) -> Self {
        Self {
            window_days,
            ..Default::default()
        }
    }
}

/// Start of the trailing window ending at `now`
pub fn window_start(now: DateTime<Utc>, window_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(window_days))
}

/// Where a recompute currently stands
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RecomputePhase {
    #[default]
    Idle,
    Fetching,
    Computing,
    Applied { previous: f64, new: f64 },
    InsufficientData { found: usize },
    Failed { message: String },
}

impl RecomputePhase {
    pub fn is_running(&self) -> bool {
        matches!(self, RecomputePhase::Fetching | RecomputePhase::Computing)
    }
}

/// Everything a single recompute worked out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recomputation {
    pub window_days: u32,
    pub weight_samples: usize,
    pub intake_records: usize,
    /// Trend slope in lbs per day
    pub slope: f64,
    pub regression_difference: f64,
    pub intake_calories: f64,
    /// Calorie correction for the gap between target and observed trend
    pub trend_correction: f64,
    /// Average daily intake shortfall against the current estimate
    pub intake_deviation: f64,
    pub adjustment: f64,
    pub applied_step: f64,
    pub capped: bool,
    pub previous_expenditure: f64,
    pub new_expenditure: f64,
}

impl Recomputation {
    pub fn change(&self) -> f64 {
        self.new_expenditure - self.previous_expenditure
    }
}

/// At least two samples are needed to fit a trend
pub fn ensure_enough_weights(samples: &[WeightSample], window_days: u32) -> TrackerResult<()> {
    if samples.len() < 2 {
        return Err(TrackerError::InsufficientHistory {
            found: samples.len(),
            window_days,
        });
    }
    Ok(())
}

/// Compute a new expenditure estimate.
///
/// Intake records already carry the fat surcharge in their grams, so they are
/// summed with `calories_from_grams` only. Half of the adjustment is applied,
/// clamped to `max_step_kcal` when set, and rounded once.
pub fn compute_expenditure(
    current_expenditure: f64,
    delta_lb_per_week: f64,
    weights: &[WeightSample],
    intake: &[IntakeRecord],
    params: &RecomputeParams,
    config: &ServingConfig,
) -> TrackerResult<Recomputation> {
    if params.window_days == 0 {
        return Err(TrackerError::validation("window_days must be at least 1"));
    }
    ensure_enough_weights(weights, params.window_days)?;

    let mut sorted = weights.to_vec();
    sorted.sort_by_key(|s| (s.created, s.id));
    let trend = weight_trend(&sorted)?;

    let intake_calories: f64 = intake
        .iter()
        .map(|r| calories_from_grams(&r.grams(), config))
        .sum();

    let days = f64::from(params.window_days);
    let trend_correction = (delta_lb_per_week - trend.regression_difference) * KCAL_PER_LB_PER_WEEK;
    let intake_deviation = (current_expenditure * days - intake_calories) / days;
    let adjustment = trend_correction - intake_deviation;

    let half = adjustment / 2.0;
    let (step, capped) = match params.max_step_kcal {
        Some(cap) if half.abs() > cap => (half.signum() * cap, true),
        _ => (half, false),
    };
    let applied_step = step.round();

    Ok(Recomputation {
        window_days: params.window_days,
        weight_samples: sorted.len(),
        intake_records: intake.len(),
        slope: trend.line.slope,
        regression_difference: trend.regression_difference,
        intake_calories,
        trend_correction,
        intake_deviation,
        adjustment,
        applied_step,
        capped,
        previous_expenditure: current_expenditure,
        new_expenditure: current_expenditure + applied_step,
    })
}
