//! Nutrition accounting module
//!
//! Serving constants and the serving -> grams -> calories conversions.

pub mod accounting;
pub mod serving_config;

pub use accounting::{
    calories_from_grams, calories_per_serving, display_grams, exact_calories, grams_for,
    grams_from_servings, target_calories, total_calories, MacroGrams,
};
pub use serving_config::{ServingConfig, DEFAULT_ADDITIONAL_FAT_PERCENT};
