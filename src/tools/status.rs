//! Macrotrack Status Tool
//!
//! Provides runtime status information about the macrotrack service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Tracking instructions for AI assistants
pub const TRACKER_INSTRUCTIONS: &str = r#"
# Macrotrack Instructions

Macrotrack counts **servings** of four macros over a day and keeps an adaptive
estimate of daily calorie expenditure (TDEE).

## Servings

| Macro | One serving | kcal/serving (15% surcharge) |
|-------|-------------|------------------------------|
| protein | 25 g | 133.75 |
| carbs | 25 g | 133.75 |
| fat | 13 g | 117 |
| alcohol | 15 g | 105 |

Protein and carb servings carry an **additional fat surcharge**
(`additional_fat_percent`, default 15): that share of their grams is counted
as extra fat, because whole-food protein and carb sources are rarely fat-free.

- `increment_macro` / `decrement_macro` with `macro`: protein, carbs, fat or alcohol
- `get_today` shows servings, grams, calories, targets and remaining calories
- Decrementing at zero does nothing

## Day rollover

The first call on a new day archives yesterday's servings as an intake record
(stamped at noon UTC of that day) and starts a fresh count. If the store is
unreachable the day stays queued; `sync_pending` retries it.

`reset_daily` archives the current servings immediately and clears them. If
the archive cannot be saved the servings are kept.

## Weight and expenditure

1. Log weight with `log_weight` (lbs), ideally every morning
2. Set the goal with `update_settings` → `delta_lb_per_week` (negative to lose)
3. Call `recompute_expenditure` about once a week

The recompute fits a trend line through the window's weights, compares it to
the goal and to the intake archived over the same window, and moves the
estimate by half the computed adjustment (at most 250 kcal per run by
default). It needs at least 2 weight entries at different times in the
window; otherwise the status is `insufficient_data` and nothing changes.

Statuses: `applied`, `insufficient_data`, `failed`, `busy`.
"#;

/// Runtime status of the macrotrack service
#[derive(Debug, Clone, Serialize)]
pub struct MacrotrackStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Tracker configuration
    pub user_id: String,
    pub window_days: u32,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    user_id: String,
    window_days: u32,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, user_id: String, window_days: u32) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            user_id,
            window_days,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> MacrotrackStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        MacrotrackStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            user_id: self.user_id.clone(),
            window_days: self.window_days,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/macrotrack.db"), "local".into(), 7);
        let status = tracker.get_status();
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.window_days, 7);
    }

    #[test]
    fn test_instructions_name_every_status() {
        for status in ["applied", "insufficient_data", "failed", "busy"] {
            assert!(TRACKER_INSTRUCTIONS.contains(status));
        }
    }
}
