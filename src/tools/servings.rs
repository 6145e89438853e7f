//! Daily serving MCP Tools
//!
//! Tools for counting today's servings and archiving finished days.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Macro;
use crate::nutrition::MacroGrams;
use crate::tracker::{DailyTotals, SyncReport, Tracker};

/// Response for reset_daily
#[derive(Debug, Serialize)]
pub struct ResetDailyResponse {
    pub archived: bool,
    pub archived_record_id: Option<i64>,
    pub archived_grams: Option<MacroGrams>,
    pub archived_calories: Option<f64>,
    pub today: DailyTotals,
}

/// Response for sync_pending
#[derive(Debug, Serialize)]
pub struct SyncPendingResponse {
    pub archived: usize,
    pub still_pending: usize,
    pub message: String,
}

fn parse_macro(name: &str) -> Result<Macro, String> {
    Macro::from_str(name).ok_or_else(|| {
        format!(
            "Unknown macro '{}'. Use protein, carbs, fat or alcohol",
            name
        )
    })
}

// ============================================================================
// Serving Tools
// ============================================================================

/// Today's servings, grams and calories
pub async fn get_today(tracker: &Tracker, now: DateTime<Utc>) -> Result<DailyTotals, String> {
    Ok(tracker.today(now.date_naive()).await)
}

/// Add one serving of a macro
pub async fn increment_macro(
    tracker: &Tracker,
    macro_name: &str,
    now: DateTime<Utc>,
) -> Result<DailyTotals, String> {
    let m = parse_macro(macro_name)?;
    Ok(tracker.increment(m, now.date_naive()).await)
}

/// Remove one serving of a macro (stays at zero)
pub async fn decrement_macro(
    tracker: &Tracker,
    macro_name: &str,
    now: DateTime<Utc>,
) -> Result<DailyTotals, String> {
    let m = parse_macro(macro_name)?;
    Ok(tracker.decrement(m, now.date_naive()).await)
}

/// Archive today's servings and start over
pub async fn reset_daily(tracker: &Tracker, now: DateTime<Utc>) -> Result<ResetDailyResponse, String> {
    let outcome = tracker
        .reset_daily(now)
        .await
        .map_err(|e| format!("Failed to reset day: {}", e))?;

    let serving = tracker.config().serving;
    Ok(ResetDailyResponse {
        archived: outcome.archived.is_some(),
        archived_record_id: outcome.archived.as_ref().map(|r| r.id),
        archived_grams: outcome.archived.as_ref().map(|r| r.grams()),
        archived_calories: outcome.archived.as_ref().map(|r| r.calories(&serving)),
        today: outcome.totals,
    })
}

/// Retry archiving finished days that could not be saved earlier
pub async fn sync_pending(tracker: &Tracker) -> Result<SyncPendingResponse, String> {
    let SyncReport { archived, pending } = tracker
        .sync_pending()
        .await
        .map_err(|e| format!("Failed to archive pending days: {}", e))?;

    let message = if archived == 0 && pending == 0 {
        "Nothing to archive".to_string()
    } else {
        format!("Archived {} day(s), {} still pending", archived, pending)
    };

    Ok(SyncPendingResponse {
        archived,
        still_pending: pending,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::store::{MemoryLocalStore, MemoryRecordStore};
    use chrono::TimeZone;
    use std::sync::Arc;

    async fn tracker(now: DateTime<Utc>) -> Tracker {
        Tracker::open(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryLocalStore::new()),
            TrackerConfig::default(),
            now.date_naive(),
        )
        .await
    }

    #[tokio::test]
    async fn test_increment_by_name() {
        let now = Utc.with_ymd_and_hms(2026, 1, 16, 9, 0, 0).unwrap();
        let tracker = tracker(now).await;

        let totals = increment_macro(&tracker, "carbs", now).await.unwrap();
        assert_eq!(totals.servings.carbs, 1.0);
        let totals = decrement_macro(&tracker, "Carbohydrate", now).await.unwrap();
        assert_eq!(totals.servings.carbs, 0.0);

        let err = increment_macro(&tracker, "fiber", now).await.unwrap_err();
        assert!(err.contains("Unknown macro"));
    }

    #[tokio::test]
    async fn test_reset_reports_archive() {
        let now = Utc.with_ymd_and_hms(2026, 1, 16, 21, 0, 0).unwrap();
        let tracker = tracker(now).await;

        let response = reset_daily(&tracker, now).await.unwrap();
        assert!(!response.archived);

        increment_macro(&tracker, "fat", now).await.unwrap();
        let response = reset_daily(&tracker, now).await.unwrap();
        assert!(response.archived);
        assert_eq!(response.archived_calories, Some(117.0));
        assert_eq!(response.today.total_calories, 0);

        let sync = sync_pending(&tracker).await.unwrap();
        assert_eq!(sync.message, "Nothing to archive");
    }
}
