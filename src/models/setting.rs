//! Settings model
//!
//! Per-user numeric settings, stored as key/value pairs and upserted one key
//! at a time.

use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::servings::MacroServings;
use crate::db::DbResult;
use crate::error::{TrackerError, TrackerResult};
use crate::nutrition::DEFAULT_ADDITIONAL_FAT_PERCENT;

pub const DEFAULT_CALORIE_EXPENDITURE: f64 = 2000.0;

/// Largest target rate of change accepted, in lbs per week
pub const MAX_DELTA_LB_PER_WEEK: f64 = 5.0;

/// Setting key enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    ProteinServings,
    CarbohydrateServings,
    FatServings,
    AlcoholServings,
    AdditionalFatPercent,
    CalorieExpenditure,
    DeltaLbPerWeek,
}

impl SettingKey {
    pub const ALL: [SettingKey; 7] = [
        SettingKey::ProteinServings,
        SettingKey::CarbohydrateServings,
        SettingKey::FatServings,
        SettingKey::AlcoholServings,
        SettingKey::AdditionalFatPercent,
        SettingKey::CalorieExpenditure,
        SettingKey::DeltaLbPerWeek,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ProteinServings => "protein_servings",
            SettingKey::CarbohydrateServings => "carbohydrate_servings",
            SettingKey::FatServings => "fat_servings",
            SettingKey::AlcoholServings => "alcohol_servings",
            SettingKey::AdditionalFatPercent => "additional_fat_percent",
            SettingKey::CalorieExpenditure => "calorie_expenditure",
            SettingKey::DeltaLbPerWeek => "delta_lb_per_week",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        SettingKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim().to_lowercase())
    }
}

/// The user's settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub targets: MacroServings,
    pub additional_fat_percent: f64,
    pub calorie_expenditure: f64,
    pub delta_lb_per_week: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            targets: MacroServings::default_targets(),
            additional_fat_percent: DEFAULT_ADDITIONAL_FAT_PERCENT,
            calorie_expenditure: DEFAULT_CALORIE_EXPENDITURE,
            delta_lb_per_week: 0.0,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> f64 {
        match key {
            SettingKey::ProteinServings => self.targets.protein,
            SettingKey::CarbohydrateServings => self.targets.carbs,
            SettingKey::FatServings => self.targets.fat,
            SettingKey::AlcoholServings => self.targets.alcohol,
            SettingKey::AdditionalFatPercent => self.additional_fat_percent,
            SettingKey::CalorieExpenditure => self.calorie_expenditure,
            SettingKey::DeltaLbPerWeek => self.delta_lb_per_week,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: f64) {
        match key {
            SettingKey::ProteinServings => self.targets.protein = value,
            SettingKey::CarbohydrateServings => self.targets.carbs = value,
            SettingKey::FatServings => self.targets.fat = value,
            SettingKey::AlcoholServings => self.targets.alcohol = value,
            SettingKey::AdditionalFatPercent => self.additional_fat_percent = value,
            SettingKey::CalorieExpenditure => self.calorie_expenditure = value,
            SettingKey::DeltaLbPerWeek => self.delta_lb_per_week = value,
        }
    }

    /// Apply stored pairs over the current values, skipping invalid ones
    pub fn apply_entries(&mut self, entries: &[(SettingKey, f64)]) {
        for (key, value) in entries {
            match validate_setting(*key, *value) {
                Ok(v) => self.set(*key, v),
                Err(e) => tracing::warn!("Ignoring stored {}: {}", key.as_str(), e),
            }
        }
    }

    pub fn entries(&self) -> Vec<(SettingKey, f64)> {
        SettingKey::ALL.iter().map(|k| (*k, self.get(*k))).collect()
    }
}

/// Partial settings change; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub protein_servings: Option<f64>,
    pub carbohydrate_servings: Option<f64>,
    pub fat_servings: Option<f64>,
    pub alcohol_servings: Option<f64>,
    pub additional_fat_percent: Option<f64>,
    pub calorie_expenditure: Option<f64>,
    pub delta_lb_per_week: Option<f64>,
}

impl SettingsUpdate {
    /// The requested changes, validated, in key order
    pub fn changes(&self) -> TrackerResult<Vec<(SettingKey, f64)>> {
        let requested = [
            (SettingKey::ProteinServings, self.protein_servings),
            (SettingKey::CarbohydrateServings, self.carbohydrate_servings),
            (SettingKey::FatServings, self.fat_servings),
            (SettingKey::AlcoholServings, self.alcohol_servings),
            (SettingKey::AdditionalFatPercent, self.additional_fat_percent),
            (SettingKey::CalorieExpenditure, self.calorie_expenditure),
            (SettingKey::DeltaLbPerWeek, self.delta_lb_per_week),
        ];

        requested
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .map(|(key, value)| validate_setting(key, value).map(|v| (key, v)))
            .collect()
    }

    pub fn set(&mut self, key: SettingKey, value: f64) {
        let slot = match key {
            SettingKey::ProteinServings => &mut self.protein_servings,
            SettingKey::CarbohydrateServings => &mut self.carbohydrate_servings,
            SettingKey::FatServings => &mut self.fat_servings,
            SettingKey::AlcoholServings => &mut self.alcohol_servings,
            SettingKey::AdditionalFatPercent => &mut self.additional_fat_percent,
            SettingKey::CalorieExpenditure => &mut self.calorie_expenditure,
            SettingKey::DeltaLbPerWeek => &mut self.delta_lb_per_week,
        };
        *slot = Some(value);
    }
}

/// Validate a single setting value
pub fn validate_setting(key: SettingKey, value: f64) -> TrackerResult<f64> {
    if !value.is_finite() {
        return Err(TrackerError::validation(format!(
            "{} must be a number",
            key.as_str()
        )));
    }

    match key {
        SettingKey::ProteinServings
        | SettingKey::CarbohydrateServings
        | SettingKey::FatServings
        | SettingKey::AlcoholServings => {
            if value < 0.0 {
                return Err(TrackerError::validation(format!(
                    "{} cannot be negative",
                    key.as_str()
                )));
            }
        }
        SettingKey::AdditionalFatPercent => {
            if !(0.0..=100.0).contains(&value) {
                return Err(TrackerError::validation(
                    "additional_fat_percent must be between 0 and 100",
                ));
            }
        }
        SettingKey::CalorieExpenditure => {
            if value <= 0.0 {
                return Err(TrackerError::validation(
                    "calorie_expenditure must be greater than 0",
                ));
            }
        }
        SettingKey::DeltaLbPerWeek => {
            if value.abs() > MAX_DELTA_LB_PER_WEEK {
                return Err(TrackerError::validation(format!(
                    "delta_lb_per_week must be within ±{}",
                    MAX_DELTA_LB_PER_WEEK
                )));
            }
        }
    }

    Ok(value)
}

/// Stored setting rows
pub struct SettingRecord;

impl SettingRecord {
    /// Insert or replace one key
    pub fn upsert(conn: &Connection, user_id: &str, key: SettingKey, value: f64) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO settings (user_id, key, value)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![user_id, key.as_str(), value],
        )?;
        Ok(())
    }

    /// All known keys stored for a user. Unknown keys are skipped.
    pub fn list(conn: &Connection, user_id: &str) -> DbResult<Vec<(SettingKey, f64)>> {
        let mut stmt = conn.prepare("SELECT key, value FROM settings WHERE user_id = ?1 ORDER BY key")?;
        let rows = stmt
            .query_map([user_id], |row| {
                let key: String = row.get(0)?;
                let value: f64 = row.get(1)?;
                Ok((key, value))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(key, value)| SettingKey::from_str(&key).map(|k| (k, value)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_key_round_trip_names() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::from_str(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::from_str("nope"), None);
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.targets, MacroServings::new(6.0, 8.0, 4.0, 0.0));
        assert_eq!(settings.additional_fat_percent, 15.0);
        assert_eq!(settings.get(SettingKey::CalorieExpenditure), DEFAULT_CALORIE_EXPENDITURE);
    }

    #[test]
    fn test_validation() {
        assert!(validate_setting(SettingKey::AdditionalFatPercent, 20.0).is_ok());
        assert!(validate_setting(SettingKey::AdditionalFatPercent, 120.0).is_err());
        assert!(validate_setting(SettingKey::ProteinServings, -1.0).is_err());
        assert!(validate_setting(SettingKey::CalorieExpenditure, 0.0).is_err());
        assert!(validate_setting(SettingKey::DeltaLbPerWeek, -1.0).is_ok());
        assert!(validate_setting(SettingKey::DeltaLbPerWeek, 9.0).is_err());
        assert!(validate_setting(SettingKey::FatServings, f64::NAN).is_err());
    }

    #[test]
    fn test_update_changes_rejects_any_invalid_field() {
        let update = SettingsUpdate {
            protein_servings: Some(5.0),
            additional_fat_percent: Some(-5.0),
            ..Default::default()
        };
        assert!(update.changes().is_err());

        let update = SettingsUpdate {
            protein_servings: Some(5.0),
            delta_lb_per_week: Some(-0.5),
            ..Default::default()
        };
        assert_eq!(
            update.changes().unwrap(),
            vec![
                (SettingKey::ProteinServings, 5.0),
                (SettingKey::DeltaLbPerWeek, -0.5)
            ]
        );
    }

    #[test]
    fn test_apply_entries_skips_invalid() {
        let mut settings = Settings::default();
        settings.apply_entries(&[
            (SettingKey::CalorieExpenditure, 2500.0),
            (SettingKey::AdditionalFatPercent, 400.0),
        ]);
        assert_eq!(settings.calorie_expenditure, 2500.0);
        assert_eq!(settings.additional_fat_percent, 15.0);
    }

    #[test]
    fn test_upsert_and_list() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        SettingRecord::upsert(&conn, "u1", SettingKey::CalorieExpenditure, 2400.0).unwrap();
        SettingRecord::upsert(&conn, "u1", SettingKey::CalorieExpenditure, 2450.0).unwrap();
        SettingRecord::upsert(&conn, "u1", SettingKey::DeltaLbPerWeek, -1.0).unwrap();
        SettingRecord::upsert(&conn, "u2", SettingKey::DeltaLbPerWeek, 0.5).unwrap();

        let mut entries = SettingRecord::list(&conn, "u1").unwrap();
        entries.sort_by_key(|(k, _)| k.as_str());
        assert_eq!(
            entries,
            vec![
                (SettingKey::CalorieExpenditure, 2450.0),
                (SettingKey::DeltaLbPerWeek, -1.0)
            ]
        );
    }
}
