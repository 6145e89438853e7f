//! Expenditure recompute scenarios driven through the tracker
//!
//! Each scenario starts from an estimate of 2500 kcal, logs weights and
//! archived intake over the trailing week and checks the new estimate.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use macrotrack::config::TrackerConfig;
use macrotrack::expenditure::RecomputePhase;
use macrotrack::models::{IntakeCreate, SettingKey, SettingsUpdate};
use macrotrack::nutrition::MacroGrams;
use macrotrack::store::{MemoryLocalStore, MemoryRecordStore, RecordStore};
use macrotrack::tracker::Tracker;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 16, 12, 0, 0).unwrap()
}

struct Scenario {
    store: Arc<MemoryRecordStore>,
    tracker: Tracker,
}

impl Scenario {
    async fn new(delta_lb_per_week: f64) -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        let config = TrackerConfig {
            user_id: "test-user".into(),
            ..TrackerConfig::default()
        };
        let tracker = Tracker::open(
            store.clone(),
            Arc::new(MemoryLocalStore::new()),
            config,
            now().date_naive(),
        )
        .await;

        tracker
            .update_settings(&SettingsUpdate {
                calorie_expenditure: Some(2500.0),
                delta_lb_per_week: Some(delta_lb_per_week),
                ..Default::default()
            })
            .await
            .unwrap();

        Self { store, tracker }
    }

    async fn weigh(&self, days_ago: i64, weight_lbs: f64) {
        self.tracker
            .log_weight(weight_lbs, now() - Duration::days(days_ago))
            .await
            .unwrap();
    }

    async fn eat(&self, days_ago: i64, grams: MacroGrams) {
        self.store
            .create_intake(&IntakeCreate {
                user_id: "test-user".into(),
                grams,
                created: now() - Duration::days(days_ago),
            })
            .await
            .unwrap();
    }

    async fn eat_every_day(&self, grams: MacroGrams) {
        for days_ago in 0..7 {
            self.eat(days_ago, grams).await;
        }
    }

    async fn recompute(&self) -> f64 {
        self.tracker.recompute_expenditure(now()).await.unwrap();
        self.tracker.settings().await.calorie_expenditure
    }
}

#[tokio::test]
async fn steady_loss_at_maintenance_intake() {
    let s = Scenario::new(-1.0).await;
    for i in 0..7 {
        s.weigh(6 - i, 180.0 - 0.2 * i as f64).await;
    }
    s.eat_every_day(MacroGrams::new(150.0, 200.0, 104.5, 0.0)).await;

    assert_eq!(s.recompute().await, 2470.0);
}

#[tokio::test]
async fn losing_faster_than_target_raises_estimate() {
    let s = Scenario::new(-1.0).await;
    s.weigh(6, 180.0).await;
    s.weigh(0, 178.0).await;
    s.eat_every_day(MacroGrams::new(150.0, 200.0, 104.5, 0.0)).await;

    assert_eq!(s.recompute().await, 2670.0);
}

#[tokio::test]
async fn losing_slower_than_target_lowers_estimate() {
    let s = Scenario::new(-1.0).await;
    s.weigh(6, 180.0).await;
    s.weigh(0, 179.5).await;
    s.eat_every_day(MacroGrams::new(150.0, 200.0, 104.5, 0.0)).await;

    assert_eq!(s.recompute().await, 2295.0);
}

#[tokio::test]
async fn gaining_on_target() {
    let s = Scenario::new(0.5).await;
    s.weigh(6, 180.0).await;
    s.weigh(0, 180.5).await;
    s.eat_every_day(MacroGrams::new(200.0, 250.0, 117.5, 0.0)).await;

    assert_eq!(s.recompute().await, 2679.0);
}

#[tokio::test]
async fn varying_daily_macros() {
    let s = Scenario::new(-1.0).await;
    s.weigh(6, 180.0).await;
    s.weigh(0, 179.0).await;

    let days = [
        (6, MacroGrams::new(200.0, 150.0, 96.5, 0.0)),
        (5, MacroGrams::new(150.0, 250.0, 112.0, 0.0)),
        (4, MacroGrams::new(175.0, 200.0, 108.75, 15.0)),
        (3, MacroGrams::new(160.0, 180.0, 103.0, 0.0)),
        (2, MacroGrams::new(140.0, 220.0, 106.0, 30.0)),
        (1, MacroGrams::new(180.0, 190.0, 107.5, 0.0)),
        (0, MacroGrams::new(155.0, 210.0, 106.75, 15.0)),
    ];
    for (days_ago, grams) in days {
        s.eat(days_ago, grams).await;
    }

    assert_eq!(s.recompute().await, 2487.0);
}

#[tokio::test]
async fn single_weight_leaves_estimate_unchanged() {
    let s = Scenario::new(-1.0).await;
    s.weigh(0, 180.0).await;
    s.eat_every_day(MacroGrams::new(150.0, 200.0, 104.5, 0.0)).await;

    let err = s.tracker.recompute_expenditure(now()).await.unwrap_err();
    assert!(err.to_string().contains("Need at least 2 weight entries"));
    assert_eq!(s.tracker.settings().await.calorie_expenditure, 2500.0);
    assert_eq!(
        s.tracker.recompute_phase().await,
        RecomputePhase::InsufficientData { found: 1 }
    );
}

#[tokio::test]
async fn weights_outside_window_are_ignored() {
    let s = Scenario::new(-1.0).await;
    s.weigh(20, 190.0).await;
    s.weigh(6, 180.0).await;
    s.weigh(0, 178.0).await;
    s.eat(20, MacroGrams::new(0.0, 1000.0, 0.0, 0.0)).await;
    s.eat_every_day(MacroGrams::new(150.0, 200.0, 104.5, 0.0)).await;

    assert_eq!(s.recompute().await, 2670.0);
}

#[tokio::test]
async fn new_estimate_is_persisted() {
    let s = Scenario::new(-1.0).await;
    s.weigh(6, 180.0).await;
    s.weigh(0, 178.0).await;
    s.eat_every_day(MacroGrams::new(150.0, 200.0, 104.5, 0.0)).await;
    s.recompute().await;

    let stored = s.store.list_settings("test-user").await.unwrap();
    assert!(stored.contains(&(SettingKey::CalorieExpenditure, 2670.0)));
}

#[tokio::test]
async fn failed_save_keeps_previous_estimate() {
    let s = Scenario::new(-1.0).await;
    s.weigh(6, 180.0).await;
    s.weigh(0, 178.0).await;

    s.store.set_offline(true);
    let err = s.tracker.recompute_expenditure(now()).await.unwrap_err();
    assert_eq!(err.kind(), "network_failure");
    assert_eq!(s.tracker.settings().await.calorie_expenditure, 2500.0);

    s.store.set_offline(false);
    assert!(s.tracker.recompute_expenditure(now()).await.is_ok());
}
