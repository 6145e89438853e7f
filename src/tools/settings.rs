//! Settings MCP Tools
//!
//! Tools for reading and changing targets, the fat surcharge, the expenditure
//! estimate and the target rate of change.

use serde::Serialize;

use crate::models::{Macro, Settings, SettingsUpdate};
use crate::nutrition::{calories_per_serving, target_calories};
use crate::tracker::Tracker;

/// Calories in one serving of each macro at the current surcharge
#[derive(Debug, Serialize)]
pub struct ServingCalories {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub alcohol: f64,
}

/// Response for get_settings / update_settings
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: Settings,
    pub target_calories: i64,
    /// Planned surplus (positive) or deficit (negative)
    pub target_delta: f64,
    pub calories_per_serving: ServingCalories,
}

fn settings_response(tracker: &Tracker, settings: Settings) -> SettingsResponse {
    let serving = tracker.config().serving;
    let pct = settings.additional_fat_percent;
    let target = target_calories(&settings.targets, &serving, pct);

    SettingsResponse {
        target_calories: target,
        target_delta: target as f64 - settings.calorie_expenditure,
        calories_per_serving: ServingCalories {
            protein: calories_per_serving(Macro::Protein, &serving, pct),
            carbs: calories_per_serving(Macro::Carbs, &serving, pct),
            fat: calories_per_serving(Macro::Fat, &serving, pct),
            alcohol: calories_per_serving(Macro::Alcohol, &serving, pct),
        },
        settings,
    }
}

/// Current settings
pub async fn get_settings(tracker: &Tracker) -> Result<SettingsResponse, String> {
    let settings = tracker.settings().await;
    Ok(settings_response(tracker, settings))
}

/// Change one or more settings. Values are validated before anything is saved.
pub async fn update_settings(
    tracker: &Tracker,
    update: SettingsUpdate,
) -> Result<SettingsResponse, String> {
    if update == SettingsUpdate::default() {
        return Err("No settings provided".to_string());
    }

    let settings = tracker
        .update_settings(&update)
        .await
        .map_err(|e| format!("Failed to update settings: {}", e))?;
    Ok(settings_response(tracker, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::store::{MemoryLocalStore, MemoryRecordStore};
    use chrono::NaiveDate;
    use std::sync::Arc;

    async fn tracker() -> Tracker {
        Tracker::open(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryLocalStore::new()),
            TrackerConfig::default(),
            NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn test_get_settings_defaults() {
        let tracker = tracker().await;
        let response = get_settings(&tracker).await.unwrap();
        assert_eq!(response.target_calories, 2341);
        assert_eq!(response.calories_per_serving.protein, 133.75);
        assert_eq!(response.calories_per_serving.alcohol, 105.0);
    }

    #[tokio::test]
    async fn test_update_surcharge_changes_serving_calories() {
        let tracker = tracker().await;
        let response = update_settings(
            &tracker,
            SettingsUpdate {
                additional_fat_percent: Some(20.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(response.calories_per_serving.protein, 145.0);
        assert_eq!(response.settings.additional_fat_percent, 20.0);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let tracker = tracker().await;
        let err = update_settings(&tracker, SettingsUpdate::default()).await.unwrap_err();
        assert_eq!(err, "No settings provided");
    }
}
