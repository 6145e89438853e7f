//! Intake history MCP Tools

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::tracker::{IntakeDay, Tracker};

/// Response for list_intake
#[derive(Debug, Serialize)]
pub struct ListIntakeResponse {
    pub window_days: u32,
    pub count: usize,
    pub records: Vec<IntakeDay>,
    pub total_calories: f64,
    /// Total spread over the whole window, including days with no record
    pub average_daily_calories: f64,
}

/// Archived intake in the trailing window with calories per record
pub async fn list_intake(
    tracker: &Tracker,
    days: u32,
    now: DateTime<Utc>,
) -> Result<ListIntakeResponse, String> {
    let history = tracker
        .intake_history(days, now)
        .await
        .map_err(|e| format!("Failed to list intake: {}", e))?;

    Ok(ListIntakeResponse {
        window_days: history.window_days,
        count: history.records.len(),
        average_daily_calories: history.total_calories / f64::from(history.window_days),
        total_calories: history.total_calories,
        records: history.records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::models::Macro;
    use crate::store::{MemoryLocalStore, MemoryRecordStore};
    use chrono::TimeZone;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_intake_average_over_window() {
        let now = Utc.with_ymd_and_hms(2026, 1, 16, 20, 0, 0).unwrap();
        let tracker = Tracker::open(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryLocalStore::new()),
            TrackerConfig::default(),
            now.date_naive(),
        )
        .await;

        for _ in 0..6 {
            tracker.increment(Macro::Protein, now.date_naive()).await;
        }
        tracker.reset_daily(now).await.unwrap();

        let response = list_intake(&tracker, 7, now).await.unwrap();
        assert_eq!(response.count, 1);
        // 150 g protein + 22.5 g fat
        assert!((response.total_calories - 802.5).abs() < 1e-9);
        assert!((response.average_daily_calories - 802.5 / 7.0).abs() < 1e-9);

        assert!(list_intake(&tracker, 0, now).await.is_err());
    }
}
