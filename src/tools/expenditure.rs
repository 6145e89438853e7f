//! Expenditure MCP Tools
//!
//! Recompute results are always reported through a `status` field; the tool
//! itself only fails on serialization.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::TrackerError;
use crate::expenditure::{RecomputeParams, RecomputePhase, Recomputation};
use crate::tracker::Tracker;

/// Response for recompute_expenditure
#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    /// applied, insufficient_data, failed or busy
    pub status: &'static str,
    pub message: String,
    pub calorie_expenditure: f64,
    pub report: Option<Recomputation>,
}

/// Response for recompute_status
#[derive(Debug, Serialize)]
pub struct RecomputeStatusResponse {
    pub phase: RecomputePhase,
    pub calorie_expenditure: f64,
    pub delta_lb_per_week: f64,
    pub window_days: u32,
}

/// Recompute the expenditure estimate over the trailing window
pub async fn recompute_expenditure(
    tracker: &Tracker,
    window_days: Option<u32>,
    now: DateTime<Utc>,
) -> RecomputeResponse {
    let params = RecomputeParams {
        window_days: window_days.unwrap_or(tracker.config().window_days),
        max_step_kcal: tracker.config().max_step_kcal,
    };

    let result = tracker.recompute_with(now, params).await;
    let calorie_expenditure = tracker.settings().await.calorie_expenditure;

    match result {
        Ok(report) => RecomputeResponse {
            status: "applied",
            message: format!(
                "Expenditure updated from {} to {} kcal",
                report.previous_expenditure, report.new_expenditure
            ),
            calorie_expenditure,
            report: Some(report),
        },
        Err(e) => RecomputeResponse {
            status: status_for(&e),
            message: e.to_string(),
            calorie_expenditure,
            report: None,
        },
    }
}

fn status_for(err: &TrackerError) -> &'static str {
    if err.is_insufficient_history() {
        "insufficient_data"
    } else if matches!(err, TrackerError::RecomputeInProgress) {
        "busy"
    } else {
        "failed"
    }
}

/// Where the last recompute ended up
pub async fn recompute_status(tracker: &Tracker) -> RecomputeStatusResponse {
    let settings = tracker.settings().await;
    RecomputeStatusResponse {
        phase: tracker.recompute_phase().await,
        calorie_expenditure: settings.calorie_expenditure,
        delta_lb_per_week: settings.delta_lb_per_week,
        window_days: tracker.config().window_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::store::{MemoryLocalStore, MemoryRecordStore};
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_status_field_per_outcome() {
        let now = Utc.with_ymd_and_hms(2026, 1, 16, 12, 0, 0).unwrap();
        let store = Arc::new(MemoryRecordStore::new());
        let tracker = Tracker::open(
            store.clone(),
            Arc::new(MemoryLocalStore::new()),
            TrackerConfig::default(),
            now.date_naive(),
        )
        .await;

        let response = recompute_expenditure(&tracker, None, now).await;
        assert_eq!(response.status, "insufficient_data");
        assert!(response.message.contains("found 0"));
        assert_eq!(response.calorie_expenditure, 2000.0);

        tracker.log_weight(180.0, now - Duration::days(6)).await.unwrap();
        tracker.log_weight(179.0, now).await.unwrap();

        store.set_offline(true);
        let response = recompute_expenditure(&tracker, None, now).await;
        assert_eq!(response.status, "failed");
        store.set_offline(false);

        // No intake logged: the estimate drops by the capped step
        let response = recompute_expenditure(&tracker, Some(7), now).await;
        assert_eq!(response.status, "applied");
        assert_eq!(response.calorie_expenditure, 1750.0);
        assert!(response.report.unwrap().capped);

        let status = recompute_status(&tracker).await;
        assert_eq!(
            status.phase,
            RecomputePhase::Applied {
                previous: 2000.0,
                new: 1750.0
            }
        );
    }
}
