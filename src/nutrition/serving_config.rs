//! Serving sizes and energy densities
//!
//! Grams per serving and calories per gram for each macro.

use serde::{Deserialize, Serialize};

use crate::models::Macro;

pub const PROTEIN_GRAMS_PER_SERVING: f64 = 25.0;
pub const CARB_GRAMS_PER_SERVING: f64 = 25.0;
pub const FAT_GRAMS_PER_SERVING: f64 = 13.0;
pub const ALCOHOL_GRAMS_PER_SERVING: f64 = 15.0;

pub const PROTEIN_KCAL_PER_GRAM: f64 = 4.0;
pub const CARB_KCAL_PER_GRAM: f64 = 4.0;
pub const FAT_KCAL_PER_GRAM: f64 = 9.0;
pub const ALCOHOL_KCAL_PER_GRAM: f64 = 7.0;

/// Extra fat attributed to protein and carb servings, in percent of their grams
pub const DEFAULT_ADDITIONAL_FAT_PERCENT: f64 = 15.0;

/// Serving constants, read-only once the tracker starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingConfig {
    pub protein_grams: f64,
    pub carb_grams: f64,
    pub fat_grams: f64,
    pub alcohol_grams: f64,
    pub protein_kcal_per_gram: f64,
    pub carb_kcal_per_gram: f64,
    pub fat_kcal_per_gram: f64,
    pub alcohol_kcal_per_gram: f64,
}

impl ServingConfig {
    pub const STANDARD: ServingConfig = ServingConfig {
        protein_grams: PROTEIN_GRAMS_PER_SERVING,
        carb_grams: CARB_GRAMS_PER_SERVING,
        fat_grams: FAT_GRAMS_PER_SERVING,
        alcohol_grams: ALCOHOL_GRAMS_PER_SERVING,
        protein_kcal_per_gram: PROTEIN_KCAL_PER_GRAM,
        carb_kcal_per_gram: CARB_KCAL_PER_GRAM,
        fat_kcal_per_gram: FAT_KCAL_PER_GRAM,
        alcohol_kcal_per_gram: ALCOHOL_KCAL_PER_GRAM,
    };

    pub fn grams_per_serving(&self, m: Macro) -> f64 {
        match m {
            Macro::Protein => self.protein_grams,
            Macro::Carbs => self.carb_grams,
            Macro::Fat => self.fat_grams,
            Macro::Alcohol => self.alcohol_grams,
        }
    }

    pub fn kcal_per_gram(&self, m: Macro) -> f64 {
        match m {
            Macro::Protein => self.protein_kcal_per_gram,
            Macro::Carbs => self.carb_kcal_per_gram,
            Macro::Fat => self.fat_kcal_per_gram,
            Macro::Alcohol => self.alcohol_kcal_per_gram,
        }
    }

    /// Whether servings of this macro carry the additional-fat surcharge
    pub fn carries_additional_fat(m: Macro) -> bool {
        matches!(m, Macro::Protein | Macro::Carbs)
    }
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_grams() {
        let config = ServingConfig::default();
        assert_eq!(config.grams_per_serving(Macro::Protein), 25.0);
        assert_eq!(config.grams_per_serving(Macro::Carbs), 25.0);
        assert_eq!(config.grams_per_serving(Macro::Fat), 13.0);
        assert_eq!(config.grams_per_serving(Macro::Alcohol), 15.0);
    }

    #[test]
    fn test_standard_energy_density() {
        let config = ServingConfig::STANDARD;
        assert_eq!(config.kcal_per_gram(Macro::Protein), 4.0);
        assert_eq!(config.kcal_per_gram(Macro::Carbs), 4.0);
        assert_eq!(config.kcal_per_gram(Macro::Fat), 9.0);
        assert_eq!(config.kcal_per_gram(Macro::Alcohol), 7.0);
    }

    #[test]
    fn test_surcharge_applies_to_protein_and_carbs_only() {
        assert!(ServingConfig::carries_additional_fat(Macro::Protein));
        assert!(ServingConfig::carries_additional_fat(Macro::Carbs));
        assert!(!ServingConfig::carries_additional_fat(Macro::Fat));
        assert!(!ServingConfig::carries_additional_fat(Macro::Alcohol));
    }
}
