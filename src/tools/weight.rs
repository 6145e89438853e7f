//! Weight MCP Tools
//!
//! Tools for logging bodyweight and reviewing the recent trend.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::expenditure::weight_trend;
use crate::models::WeightSample;
use crate::tracker::Tracker;

/// Response for log_weight
#[derive(Debug, Serialize)]
pub struct LogWeightResponse {
    pub id: i64,
    pub weight_lbs: f64,
    pub display: String,
    pub created: String,
}

/// Response for list_weights
#[derive(Debug, Serialize)]
pub struct ListWeightsResponse {
    pub window_days: u32,
    pub count: usize,
    pub weights: Vec<WeightSample>,
    /// Raw change between the first and last entry
    pub change_lbs: Option<f64>,
    /// Fitted trend, lbs per week
    pub trend_lbs_per_week: Option<f64>,
}

/// Log a bodyweight entry
pub async fn log_weight(
    tracker: &Tracker,
    weight_lbs: f64,
    now: DateTime<Utc>,
) -> Result<LogWeightResponse, String> {
    let sample = tracker
        .log_weight(weight_lbs, now)
        .await
        .map_err(|e| format!("Failed to log weight: {}", e))?;

    Ok(LogWeightResponse {
        id: sample.id,
        weight_lbs: sample.weight_lbs,
        display: sample.format_value(),
        created: sample.created.to_rfc3339(),
    })
}

/// List weights in the trailing window with the fitted trend
pub async fn list_weights(
    tracker: &Tracker,
    days: u32,
    now: DateTime<Utc>,
) -> Result<ListWeightsResponse, String> {
    let weights = tracker
        .weight_history(days, now)
        .await
        .map_err(|e| format!("Failed to list weights: {}", e))?;

    let change_lbs = match (weights.first(), weights.last()) {
        (Some(first), Some(last)) if weights.len() > 1 => Some(last.weight_lbs - first.weight_lbs),
        _ => None,
    };

    // Too few or same-instant entries simply have no trend
    let trend_lbs_per_week = weight_trend(&weights)
        .ok()
        .map(|trend| trend.line.slope * 7.0);

    Ok(ListWeightsResponse {
        window_days: days,
        count: weights.len(),
        weights,
        change_lbs,
        trend_lbs_per_week,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::store::{MemoryLocalStore, MemoryRecordStore};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_log_and_list() {
        let now = Utc.with_ymd_and_hms(2026, 1, 16, 8, 0, 0).unwrap();
        let tracker = Tracker::open(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryLocalStore::new()),
            TrackerConfig::default(),
            now.date_naive(),
        )
        .await;

        let err = log_weight(&tracker, -1.0, now).await.unwrap_err();
        assert!(err.starts_with("Failed to log weight"));

        let logged = log_weight(&tracker, 180.0, now - Duration::days(2)).await.unwrap();
        assert_eq!(logged.display, "180.0 lbs");

        let single = list_weights(&tracker, 7, now).await.unwrap();
        assert_eq!(single.count, 1);
        assert_eq!(single.change_lbs, None);
        assert_eq!(single.trend_lbs_per_week, None);

        log_weight(&tracker, 179.0, now).await.unwrap();
        let listed = list_weights(&tracker, 7, now).await.unwrap();
        assert_eq!(listed.count, 2);
        assert_eq!(listed.change_lbs, Some(-1.0));
        let trend = listed.trend_lbs_per_week.unwrap();
        assert!((trend + 3.5).abs() < 1e-6);
    }
}
