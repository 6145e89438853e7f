//! Macro accounting
//!
//! Converts servings into grams and calories. Protein and carb servings carry
//! an additional-fat surcharge (`additional_fat_percent` of their grams, counted
//! as fat). The surcharge is applied in exactly one place,
//! [`grams_from_servings`], and every other gram or calorie view is derived
//! from it or from [`calories_per_serving`].
//!
//! Nothing here rounds except the display helpers and [`total_calories`], which
//! round once after summation (half away from zero).

use serde::{Deserialize, Serialize};

use super::serving_config::ServingConfig;
use crate::models::{Macro, MacroServings};

/// Grams per macro, keyed the way intake records are stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroGrams {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrate: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub alcohol: f64,
}

impl MacroGrams {
    pub fn new(protein: f64, carbohydrate: f64, fat: f64, alcohol: f64) -> Self {
        Self {
            protein,
            carbohydrate,
            fat,
            alcohol,
        }
    }

    pub fn get(&self, m: Macro) -> f64 {
        match m {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbohydrate,
            Macro::Fat => self.fat,
            Macro::Alcohol => self.alcohol,
        }
    }

    /// Round each macro for display
    pub fn rounded(&self) -> Self {
        Self {
            protein: self.protein.round(),
            carbohydrate: self.carbohydrate.round(),
            fat: self.fat.round(),
            alcohol: self.alcohol.round(),
        }
    }
}

impl std::ops::Add for MacroGrams {
    type Output = MacroGrams;

    fn add(self, other: MacroGrams) -> MacroGrams {
        MacroGrams {
            protein: self.protein + other.protein,
            carbohydrate: self.carbohydrate + other.carbohydrate,
            fat: self.fat + other.fat,
            alcohol: self.alcohol + other.alcohol,
        }
    }
}

impl std::iter::Sum for MacroGrams {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroGrams::default(), |acc, g| acc + g)
    }
}

/// Calories in one serving of a macro, surcharge included, unrounded
pub fn calories_per_serving(m: Macro, config: &ServingConfig, additional_fat_percent: f64) -> f64 {
    let grams = config.grams_per_serving(m);
    let own = grams * config.kcal_per_gram(m);

    if ServingConfig::carries_additional_fat(m) {
        let factor = additional_fat_percent / 100.0;
        own + grams * factor * config.fat_kcal_per_gram
    } else {
        own
    }
}

/// Unrounded calories for a set of servings
pub fn exact_calories(
    servings: &MacroServings,
    config: &ServingConfig,
    additional_fat_percent: f64,
) -> f64 {
    Macro::ALL
        .iter()
        .map(|m| servings.get(*m) * calories_per_serving(*m, config, additional_fat_percent))
        .sum()
}

/// Total calories, rounded once after summing every macro
pub fn total_calories(
    servings: &MacroServings,
    config: &ServingConfig,
    additional_fat_percent: f64,
) -> i64 {
    exact_calories(servings, config, additional_fat_percent).round() as i64
}

/// Calories implied by the daily targets
pub fn target_calories(
    targets: &MacroServings,
    config: &ServingConfig,
    additional_fat_percent: f64,
) -> i64 {
    total_calories(targets, config, additional_fat_percent)
}

/// Unrounded grams for a set of servings. Fat includes the surcharge computed
/// from unrounded protein and carb grams. This is what gets persisted.
pub fn grams_from_servings(
    servings: &MacroServings,
    config: &ServingConfig,
    additional_fat_percent: f64,
) -> MacroGrams {
    let protein = servings.protein * config.protein_grams;
    let carbohydrate = servings.carbs * config.carb_grams;
    let additional_fat = (protein + carbohydrate) * (additional_fat_percent / 100.0);
    let fat = servings.fat * config.fat_grams + additional_fat;
    let alcohol = servings.alcohol * config.alcohol_grams;

    MacroGrams {
        protein,
        carbohydrate,
        fat,
        alcohol,
    }
}

/// Grams shown to the user: the persisted conversion, each macro rounded once
pub fn display_grams(
    servings: &MacroServings,
    config: &ServingConfig,
    additional_fat_percent: f64,
) -> MacroGrams {
    grams_from_servings(servings, config, additional_fat_percent).rounded()
}

/// Rounded display grams for a single macro
pub fn grams_for(
    m: Macro,
    servings: &MacroServings,
    config: &ServingConfig,
    additional_fat_percent: f64,
) -> f64 {
    display_grams(servings, config, additional_fat_percent).get(m)
}

/// Calories in already-converted grams. No surcharge is applied: persisted
/// fat grams already include it.
pub fn calories_from_grams(grams: &MacroGrams, config: &ServingConfig) -> f64 {
    Macro::ALL
        .iter()
        .map(|m| grams.get(*m) * config.kcal_per_gram(*m))
        .sum()
}
