//! Data models
//!
//! Rust structs representing stored records and session values.

mod intake;
mod local_state;
mod servings;
mod setting;
mod weight;

pub use intake::{IntakeCreate, IntakeRecord};
pub use local_state::{
    DailySnapshot, LocalEntry, DAILY_SNAPSHOT_KEY, PENDING_ARCHIVES_KEY, SETTINGS_CACHE_KEY,
};
pub use servings::{Macro, MacroServings, Targets};
pub use setting::{
    validate_setting, SettingKey, SettingRecord, Settings, SettingsUpdate,
    DEFAULT_CALORIE_EXPENDITURE,
};
pub use weight::{validate_weight, WeightCreate, WeightSample, MAX_WEIGHT_LBS};
