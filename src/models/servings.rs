//! Serving counts
//!
//! The four macros a user logs, and the per-day counts of servings eaten.

use serde::{Deserialize, Serialize};

/// Macro type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    Protein,
    Carbs,
    Fat,
    Alcohol,
}

impl Macro {
    pub const ALL: [Macro; 4] = [Macro::Protein, Macro::Carbs, Macro::Fat, Macro::Alcohol];

    pub fn as_str(&self) -> &'static str {
        match self {
            Macro::Protein => "protein",
            Macro::Carbs => "carbs",
            Macro::Fat => "fat",
            Macro::Alcohol => "alcohol",
        }
    }

    /// Field name used by persisted intake records
    pub fn record_field(&self) -> &'static str {
        match self {
            Macro::Protein => "protein",
            Macro::Carbs => "carbohydrate",
            Macro::Fat => "fat",
            Macro::Alcohol => "alcohol",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "protein" | "p" => Some(Macro::Protein),
            "carbs" | "carb" | "carbohydrate" | "carbohydrates" | "c" => Some(Macro::Carbs),
            "fat" | "fats" | "f" => Some(Macro::Fat),
            "alcohol" | "booze" | "a" => Some(Macro::Alcohol),
            _ => None,
        }
    }
}

/// Servings of each macro. Also used for daily targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroServings {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub alcohol: f64,
}

/// Daily goals share the serving shape; they never constrain input.
pub type Targets = MacroServings;

impl MacroServings {
    pub fn new(protein: f64, carbs: f64, fat: f64, alcohol: f64) -> Self {
        Self {
            protein,
            carbs,
            fat,
            alcohol,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Default daily targets
    pub fn default_targets() -> Self {
        Self::new(6.0, 8.0, 4.0, 0.0)
    }

    pub fn get(&self, m: Macro) -> f64 {
        match m {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
            Macro::Alcohol => self.alcohol,
        }
    }

    fn slot(&mut self, m: Macro) -> &mut f64 {
        match m {
            Macro::Protein => &mut self.protein,
            Macro::Carbs => &mut self.carbs,
            Macro::Fat => &mut self.fat,
            Macro::Alcohol => &mut self.alcohol,
        }
    }

    /// Add one serving
    pub fn increment(&mut self, m: Macro) {
        *self.slot(m) += 1.0;
    }

    /// Remove one serving, never going below zero
    pub fn decrement(&mut self, m: Macro) {
        let slot = self.slot(m);
        *slot = (*slot - 1.0).max(0.0);
    }

    pub fn reset(&mut self) {
        *self = Self::zero();
    }

    pub fn is_empty(&self) -> bool {
        Macro::ALL.iter().all(|m| self.get(*m) == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_from_str_aliases() {
        assert_eq!(Macro::from_str("protein"), Some(Macro::Protein));
        assert_eq!(Macro::from_str("Carbohydrate"), Some(Macro::Carbs));
        assert_eq!(Macro::from_str(" fat "), Some(Macro::Fat));
        assert_eq!(Macro::from_str("alcohol"), Some(Macro::Alcohol));
        assert_eq!(Macro::from_str("fiber"), None);
    }

    #[test]
    fn test_increment_then_decrement_restores() {
        for m in Macro::ALL {
            let mut servings = MacroServings::new(3.0, 2.0, 1.0, 0.0);
            let before = servings.get(m);
            servings.increment(m);
            assert_eq!(servings.get(m), before + 1.0);
            servings.decrement(m);
            assert_eq!(servings.get(m), before);
        }
    }

    #[test]
    fn test_decrement_at_zero_is_noop() {
        let mut servings = MacroServings::zero();
        servings.decrement(Macro::Protein);
        assert_eq!(servings.protein, 0.0);
        assert!(servings.is_empty());
    }

    #[test]
    fn test_decrement_fractional_floors_at_zero() {
        let mut servings = MacroServings::new(0.5, 0.0, 0.0, 0.0);
        servings.decrement(Macro::Protein);
        assert_eq!(servings.protein, 0.0);
    }

    #[test]
    fn test_increment_all_macros() {
        let mut servings = MacroServings::zero();
        for m in Macro::ALL {
            servings.increment(m);
        }
        assert_eq!(servings, MacroServings::new(1.0, 1.0, 1.0, 1.0));

        servings.reset();
        assert!(servings.is_empty());
    }
}
