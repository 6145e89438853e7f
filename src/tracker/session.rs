//! Session state
//!
//! The current day's servings and the values derived from them. Mutations are
//! free functions over `SessionState`; persistence is handled by the tracker.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::expenditure::RecomputePhase;
use crate::models::{DailySnapshot, Macro, MacroServings, Settings};
use crate::nutrition::{
    display_grams, grams_from_servings, target_calories, total_calories, MacroGrams,
    ServingConfig,
};

/// Everything one user's session holds in memory
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user_id: String,
    /// The day `servings` belong to
    pub day: NaiveDate,
    pub servings: MacroServings,
    pub settings: Settings,
    pub recompute: RecomputePhase,
    /// Finished days not yet written to the intake store, oldest first
    pub pending: Vec<PendingArchive>,
}

impl SessionState {
    pub fn new(user_id: impl Into<String>, day: NaiveDate, settings: Settings) -> Self {
        Self {
            user_id: user_id.into(),
            day,
            servings: MacroServings::zero(),
            settings,
            recompute: RecomputePhase::Idle,
            pending: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> DailySnapshot {
        DailySnapshot {
            date: self.day,
            servings: self.servings,
        }
    }
}

/// A finished day converted to grams, waiting to be archived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingArchive {
    pub date: NaiveDate,
    pub created: DateTime<Utc>,
    pub grams: MacroGrams,
}

impl PendingArchive {
    /// Converted with the surcharge in effect when the day ended
    pub fn from_snapshot(
        snapshot: &DailySnapshot,
        config: &ServingConfig,
        additional_fat_percent: f64,
    ) -> Self {
        Self {
            date: snapshot.date,
            created: snapshot.archive_timestamp(),
            grams: grams_from_servings(&snapshot.servings, config, additional_fat_percent),
        }
    }
}

/// A manual reset stored `archived` for a day that has since been queued.
/// Drops the queued copy, or shrinks it to the servings added after the reset
/// took its copy. Returns whether the queue changed.
pub fn settle_pending(state: &mut SessionState, day: NaiveDate, archived: &MacroGrams) -> bool {
    let Some(pos) = state.pending.iter().position(|a| a.date == day) else {
        return false;
    };

    let queued = state.pending[pos].grams;
    let left = MacroGrams::new(
        (queued.protein - archived.protein).max(0.0),
        (queued.carbohydrate - archived.carbohydrate).max(0.0),
        (queued.fat - archived.fat).max(0.0),
        (queued.alcohol - archived.alcohol).max(0.0),
    );

    if left == MacroGrams::default() {
        state.pending.remove(pos);
    } else {
        state.pending[pos].grams = left;
    }
    true
}

/// Today's numbers as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub servings: MacroServings,
    pub targets: MacroServings,
    /// Rounded per macro
    pub grams: MacroGrams,
    pub total_calories: i64,
    pub target_calories: i64,
    pub calorie_expenditure: f64,
    /// Planned surplus (positive) or deficit (negative) against expenditure
    pub target_delta: f64,
    pub remaining_calories: i64,
    pub additional_fat_percent: f64,
}

pub fn increment_macro(state: &mut SessionState, m: Macro) {
    state.servings.increment(m);
}

/// No-op at zero
pub fn decrement_macro(state: &mut SessionState, m: Macro) {
    state.servings.decrement(m);
}

pub fn reset_servings(state: &mut SessionState) {
    state.servings.reset();
}

/// Remove archived servings, keeping anything added since the archive was taken
pub fn subtract_archived(state: &mut SessionState, archived: &MacroServings) {
    state.servings = MacroServings::new(
        (state.servings.protein - archived.protein).max(0.0),
        (state.servings.carbs - archived.carbs).max(0.0),
        (state.servings.fat - archived.fat).max(0.0),
        (state.servings.alcohol - archived.alcohol).max(0.0),
    );
}

pub fn daily_totals(state: &SessionState, config: &ServingConfig) -> DailyTotals {
    let pct = state.settings.additional_fat_percent;
    let total = total_calories(&state.servings, config, pct);
    let target = target_calories(&state.settings.targets, config, pct);
    let expenditure = state.settings.calorie_expenditure;

    DailyTotals {
        date: state.day,
        servings: state.servings,
        targets: state.settings.targets,
        grams: display_grams(&state.servings, config, pct),
        total_calories: total,
        target_calories: target,
        calorie_expenditure: expenditure,
        target_delta: target as f64 - expenditure,
        remaining_calories: target - total,
        additional_fat_percent: pct,
    }
}
