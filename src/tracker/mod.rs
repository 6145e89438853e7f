//! Macro tracker
//!
//! Owns one user's session and coordinates it with the record store (intake,
//! weight and settings collections) and the local key/value store (today's
//! snapshot, cached settings and pending archives).
//!
//! Every record store call is bounded by the configured network timeout and
//! surfaces as `TrackerError::NetworkFailure`. Local writes are best effort:
//! failures are logged and the in-memory state stays authoritative.

mod session;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::{TrackerError, TrackerResult};
use crate::expenditure::{
    compute_expenditure, ensure_enough_weights, window_start, RecomputeParams, RecomputePhase,
    Recomputation,
};
use crate::models::{
    validate_weight, DailySnapshot, IntakeCreate, IntakeRecord, Macro, SettingKey, Settings,
    SettingsUpdate, WeightCreate, WeightSample, DAILY_SNAPSHOT_KEY, PENDING_ARCHIVES_KEY,
    SETTINGS_CACHE_KEY,
};
use crate::nutrition::grams_from_servings;
use crate::store::{LocalStore, RecordFilter, RecordStore, StoreResult};

pub use session::{
    daily_totals, decrement_macro, increment_macro, reset_servings, settle_pending,
    subtract_archived, DailyTotals, PendingArchive, SessionState,
};

/// Outcome of flushing pending archives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub archived: usize,
    pub pending: usize,
}

/// Outcome of a manual reset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetOutcome {
    /// `None` when there was nothing to archive
    pub archived: Option<IntakeRecord>,
    pub totals: DailyTotals,
}

/// Intake record with its calories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeDay {
    #[serde(flatten)]
    pub record: IntakeRecord,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeHistory {
    pub window_days: u32,
    pub records: Vec<IntakeDay>,
    pub total_calories: f64,
}

/// Clears the in-flight flag when the recompute finishes, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> TrackerResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TrackerError::RecomputeInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Tracker {
    store: Arc<dyn RecordStore>,
    local: Arc<dyn LocalStore>,
    config: TrackerConfig,
    session: Mutex<SessionState>,
    /// Serializes pending-archive flushes so no day is written twice
    sync_lock: Mutex<()>,
    recompute_in_flight: AtomicBool,
}

impl Tracker {
    /// Restore the session from local state, refresh settings from the record
    /// store and roll over to `today` if the stored day has ended.
    pub async fn open(
        store: Arc<dyn RecordStore>,
        local: Arc<dyn LocalStore>,
        config: TrackerConfig,
        today: NaiveDate,
    ) -> Self {
        let settings: Settings = read_json(local.as_ref(), SETTINGS_CACHE_KEY).unwrap_or_default();
        let snapshot: Option<DailySnapshot> = read_json(local.as_ref(), DAILY_SNAPSHOT_KEY);
        let pending: Vec<PendingArchive> =
            read_json(local.as_ref(), PENDING_ARCHIVES_KEY).unwrap_or_default();

        let mut state = SessionState::new(config.user_id.clone(), today, settings);
        if let Some(snapshot) = snapshot {
            state.day = snapshot.date;
            state.servings = snapshot.servings;
        }
        state.pending = pending;

        info!(
            "Opening tracker for user '{}' (stored day {}, {} pending archive(s))",
            state.user_id,
            state.day,
            state.pending.len()
        );

        let tracker = Self {
            store,
            local,
            config,
            session: Mutex::new(state),
            sync_lock: Mutex::new(()),
            recompute_in_flight: AtomicBool::new(false),
        };

        if let Err(e) = tracker.refresh_settings().await {
            warn!("Using cached settings: {}", e);
        }

        tracker.roll_over(today).await;
        tracker
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // ========================================================================
    // Servings
    // ========================================================================

    /// Today's totals, rolling over first if the day has changed
    pub async fn today(&self, today: NaiveDate) -> DailyTotals {
        self.roll_over(today).await;
        let session = self.session.lock().await;
        daily_totals(&session, &self.config.serving)
    }

    pub async fn increment(&self, m: Macro, today: NaiveDate) -> DailyTotals {
        self.mutate(today, |state| increment_macro(state, m)).await
    }

    pub async fn decrement(&self, m: Macro, today: NaiveDate) -> DailyTotals {
        self.mutate(today, |state| decrement_macro(state, m)).await
    }

    async fn mutate<F>(&self, today: NaiveDate, f: F) -> DailyTotals
    where
        F: FnOnce(&mut SessionState),
    {
        let (totals, rolled) = {
            let mut session = self.session.lock().await;
            let rolled = self.advance_day(&mut session, today);
            f(&mut *session);
            self.save_snapshot(&session);
            (daily_totals(&session, &self.config.serving), rolled)
        };

        if rolled {
            self.flush_logged().await;
        }
        totals
    }

    /// Archive the current servings (stamped `now`) and clear them.
    ///
    /// Servings are only cleared once the record store accepts the archive; on
    /// failure they are left as they were. The archive is written under the
    /// sync lock, so a rollover that lands meanwhile queues the day but cannot
    /// flush it before the queued copy is settled against this record.
    pub async fn reset_daily(&self, now: DateTime<Utc>) -> TrackerResult<ResetOutcome> {
        let rolled = {
            let mut session = self.session.lock().await;
            self.advance_day(&mut session, now.date_naive())
        };
        if rolled {
            self.flush_logged().await;
        }

        let _sync = self.sync_lock.lock().await;
        let (user_id, day, servings, pct) = {
            let session = self.session.lock().await;
            (
                session.user_id.clone(),
                session.day,
                session.servings,
                session.settings.additional_fat_percent,
            )
        };

        if servings.is_empty() {
            let session = self.session.lock().await;
            return Ok(ResetOutcome {
                archived: None,
                totals: daily_totals(&session, &self.config.serving),
            });
        }

        let data = IntakeCreate {
            user_id,
            grams: grams_from_servings(&servings, &self.config.serving, pct),
            created: now,
        };
        let record = self
            .call("Archive intake", self.store.create_intake(&data))
            .await?;
        info!("Archived intake record {} on manual reset", record.id);

        let mut session = self.session.lock().await;
        if session.day == day {
            subtract_archived(&mut session, &servings);
            self.save_snapshot(&session);
        } else if settle_pending(&mut session, day, &data.grams) {
            debug!("{} rolled over during reset; settled its queued archive", day);
            self.save_pending(&session.pending);
        }

        Ok(ResetOutcome {
            archived: Some(record),
            totals: daily_totals(&session, &self.config.serving),
        })
    }

    // ========================================================================
    // Day rollover
    // ========================================================================

    /// Move the session to `today`, archiving the previous day if needed
    pub async fn roll_over(&self, today: NaiveDate) {
        let has_pending = {
            let mut session = self.session.lock().await;
            self.advance_day(&mut session, today);
            !session.pending.is_empty()
        };

        if has_pending {
            self.flush_logged().await;
        }
    }

    /// Write-ahead: the finished day is queued locally before servings reset.
    /// Returns whether the day changed.
    fn advance_day(&self, session: &mut SessionState, today: NaiveDate) -> bool {
        if session.day == today {
            return false;
        }

        if !session.servings.is_empty() {
            let archive = PendingArchive::from_snapshot(
                &session.snapshot(),
                &self.config.serving,
                session.settings.additional_fat_percent,
            );
            session.pending.push(archive);
            self.save_pending(&session.pending);
            info!("Queued {} for archive", archive.date);
        }

        debug!("Rolling over from {} to {}", session.day, today);
        session.day = today;
        reset_servings(session);
        self.save_snapshot(session);
        true
    }

    /// Retry pending archives in order, stopping at the first failure
    pub async fn sync_pending(&self) -> TrackerResult<SyncReport> {
        let _sync = self.sync_lock.lock().await;

        let (user_id, pending) = {
            let session = self.session.lock().await;
            (session.user_id.clone(), session.pending.clone())
        };

        let mut archived = 0;
        for archive in pending {
            let data = IntakeCreate {
                user_id: user_id.clone(),
                grams: archive.grams,
                created: archive.created,
            };
            let record = self
                .call("Archive intake", self.store.create_intake(&data))
                .await?;
            info!("Archived {} as intake record {}", archive.date, record.id);

            let mut session = self.session.lock().await;
            if session.pending.first() == Some(&archive) {
                session.pending.remove(0);
                self.save_pending(&session.pending);
            }
            archived += 1;
        }

        let session = self.session.lock().await;
        Ok(SyncReport {
            archived,
            pending: session.pending.len(),
        })
    }

    async fn flush_logged(&self) {
        match self.sync_pending().await {
            Ok(report) if report.archived > 0 => {
                info!("Archived {} pending day(s)", report.archived)
            }
            Ok(_) => {}
            Err(e) => warn!("Archives left pending: {}", e),
        }
    }

    pub async fn pending_archives(&self) -> Vec<PendingArchive> {
        self.session.lock().await.pending.clone()
    }

    // ========================================================================
    // Weight and intake history
    // ========================================================================

    pub async fn log_weight(&self, weight_lbs: f64, now: DateTime<Utc>) -> TrackerResult<WeightSample> {
        let weight_lbs = validate_weight(weight_lbs)?;
        let data = WeightCreate {
            user_id: self.user_id().await,
            weight_lbs,
            created: now,
        };
        let sample = self
            .call("Save weight", self.store.create_weight(&data))
            .await?;
        info!("Logged weight {}", sample.format_value());
        Ok(sample)
    }

    /// Weights in the trailing window, oldest first
    pub async fn weight_history(&self, days: u32, now: DateTime<Utc>) -> TrackerResult<Vec<WeightSample>> {
        let filter = self.window_filter(days, now).await?;
        self.call("Fetch weight entries", self.store.list_weights(&filter))
            .await
    }

    pub async fn intake_history(&self, days: u32, now: DateTime<Utc>) -> TrackerResult<IntakeHistory> {
        let filter = self.window_filter(days, now).await?;
        let records = self
            .call("Fetch intake records", self.store.list_intake(&filter))
            .await?;

        let records: Vec<IntakeDay> = records
            .into_iter()
            .map(|record| IntakeDay {
                calories: record.calories(&self.config.serving),
                record,
            })
            .collect();
        let total_calories = records.iter().map(|r| r.calories).sum();

        Ok(IntakeHistory {
            window_days: days,
            records,
            total_calories,
        })
    }

    async fn window_filter(&self, days: u32, now: DateTime<Utc>) -> TrackerResult<RecordFilter> {
        if days == 0 {
            return Err(TrackerError::validation("days must be at least 1"));
        }
        Ok(RecordFilter::new(self.user_id().await, window_start(now, days)))
    }

    // ========================================================================
    // Settings
    // ========================================================================

    pub async fn settings(&self) -> Settings {
        self.session.lock().await.settings.clone()
    }

    /// Pull stored settings; stored values win over the cache
    pub async fn refresh_settings(&self) -> TrackerResult<Settings> {
        let user_id = self.user_id().await;
        let entries = self
            .call("Fetch settings", self.store.list_settings(&user_id))
            .await?;

        let mut session = self.session.lock().await;
        session.settings.apply_entries(&entries);
        self.save_settings(&session.settings);
        debug!("Loaded {} stored setting(s)", entries.len());
        Ok(session.settings.clone())
    }

    /// Validate the whole update, then upsert key by key. Each key takes
    /// effect locally only once its upsert succeeds.
    ///
    /// A calorie expenditure change holds the recompute guard for the whole
    /// update, so it fails with `RecomputeInProgress` while a recompute runs.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> TrackerResult<Settings> {
        let changes = update.changes()?;
        let _in_flight = if changes
            .iter()
            .any(|(key, _)| *key == SettingKey::CalorieExpenditure)
        {
            Some(InFlight::acquire(&self.recompute_in_flight)?)
        } else {
            None
        };
        let user_id = self.user_id().await;

        for (key, value) in changes {
            self.call("Save setting", self.store.upsert_setting(&user_id, key, value))
                .await?;
            info!("Saved setting {} = {}", key.as_str(), value);

            let mut session = self.session.lock().await;
            session.settings.set(key, value);
            self.save_settings(&session.settings);
        }

        Ok(self.settings().await)
    }

    // ========================================================================
    // Expenditure recompute
    // ========================================================================

    pub async fn recompute_phase(&self) -> RecomputePhase {
        self.session.lock().await.recompute.clone()
    }

    pub async fn recompute_expenditure(&self, now: DateTime<Utc>) -> TrackerResult<Recomputation> {
        self.recompute_with(now, self.config.recompute_params()).await
    }

    /// Recompute over a window ending at `now`. Only one recompute runs at a
    /// time; a concurrent call fails with `RecomputeInProgress` and leaves the
    /// running one alone.
    pub async fn recompute_with(
        &self,
        now: DateTime<Utc>,
        params: RecomputeParams,
    ) -> TrackerResult<Recomputation> {
        let _in_flight = InFlight::acquire(&self.recompute_in_flight)?;

        self.set_phase(RecomputePhase::Fetching).await;
        let result = self.run_recompute(now, &params).await;

        let phase = match &result {
            Ok(r) => {
                info!(
                    "Expenditure {} -> {} (step {}{})",
                    r.previous_expenditure,
                    r.new_expenditure,
                    r.applied_step,
                    if r.capped { ", capped" } else { "" }
                );
                RecomputePhase::Applied {
                    previous: r.previous_expenditure,
                    new: r.new_expenditure,
                }
            }
            Err(TrackerError::InsufficientHistory { found, .. }) => {
                info!("Not enough weight entries to recompute ({} found)", found);
                RecomputePhase::InsufficientData { found: *found }
            }
            Err(TrackerError::DegenerateRegression { samples }) => {
                info!("Weight entries share one timestamp ({} found)", samples);
                RecomputePhase::InsufficientData { found: *samples }
            }
            Err(e) => {
                warn!("Expenditure recompute failed: {}", e);
                RecomputePhase::Failed {
                    message: e.to_string(),
                }
            }
        };
        self.set_phase(phase).await;

        result
    }

    async fn run_recompute(
        &self,
        now: DateTime<Utc>,
        params: &RecomputeParams,
    ) -> TrackerResult<Recomputation> {
        if params.window_days == 0 {
            return Err(TrackerError::validation("window_days must be at least 1"));
        }

        let (user_id, current, delta) = {
            let session = self.session.lock().await;
            (
                session.user_id.clone(),
                session.settings.calorie_expenditure,
                session.settings.delta_lb_per_week,
            )
        };

        let filter = RecordFilter::new(user_id.clone(), window_start(now, params.window_days));
        let weights = self
            .call("Fetch weight entries", self.store.list_weights(&filter))
            .await?;
        ensure_enough_weights(&weights, params.window_days)?;

        let intake = self
            .call("Fetch intake records", self.store.list_intake(&filter))
            .await?;
        debug!(
            "Recomputing from {} weight entries and {} intake records",
            weights.len(),
            intake.len()
        );

        self.set_phase(RecomputePhase::Computing).await;
        let result = compute_expenditure(
            current,
            delta,
            &weights,
            &intake,
            params,
            &self.config.serving,
        )?;

        self.call(
            "Save calorie expenditure",
            self.store
                .upsert_setting(&user_id, SettingKey::CalorieExpenditure, result.new_expenditure),
        )
        .await?;

        let mut session = self.session.lock().await;
        session.settings.calorie_expenditure = result.new_expenditure;
        self.save_settings(&session.settings);

        Ok(result)
    }

    async fn set_phase(&self, phase: RecomputePhase) {
        debug!("Recompute phase: {:?}", phase);
        self.session.lock().await.recompute = phase;
    }

    // ========================================================================
    // Collaborator plumbing
    // ========================================================================

    async fn user_id(&self) -> String {
        self.session.lock().await.user_id.clone()
    }

    async fn call<T, F>(&self, operation: &'static str, fut: F) -> TrackerResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.config.network_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TrackerError::network(operation, e)),
            Err(_) => Err(TrackerError::NetworkFailure {
                operation,
                reason: format!(
                    "timed out after {}s",
                    self.config.network_timeout.as_secs_f64()
                ),
            }),
        }
    }

    fn save_snapshot(&self, session: &SessionState) {
        write_json(self.local.as_ref(), DAILY_SNAPSHOT_KEY, &session.snapshot());
    }

    fn save_settings(&self, settings: &Settings) {
        write_json(self.local.as_ref(), SETTINGS_CACHE_KEY, settings);
    }

    fn save_pending(&self, pending: &[PendingArchive]) {
        if pending.is_empty() {
            if let Err(e) = self.local.remove(PENDING_ARCHIVES_KEY) {
                warn!("Failed to clear {}: {}", PENDING_ARCHIVES_KEY, e);
            }
        } else {
            write_json(self.local.as_ref(), PENDING_ARCHIVES_KEY, pending);
        }
    }
}

fn read_json<T: DeserializeOwned>(local: &dyn LocalStore, key: &str) -> Option<T> {
    let raw = match local.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unreadable {}: {}", key, e);
            None
        }
    }
}

fn write_json<T: Serialize + ?Sized>(local: &dyn LocalStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(crate::store::StoreError::from)
        .and_then(|json| local.set(key, &json));

    if let Err(e) = result {
        warn!("Failed to save {}: {}", key, e);
    }
}
