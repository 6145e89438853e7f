//! In-memory stores
//!
//! Used by tests and by callers that need a throwaway tracker. The record
//! store can be switched offline to simulate a failing backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LocalStore, RecordFilter, RecordStore, StoreError, StoreResult};
use crate::models::{IntakeCreate, IntakeRecord, SettingKey, WeightCreate, WeightSample};

#[derive(Default)]
struct Collections {
    intake: Vec<IntakeRecord>,
    weights: Vec<WeightSample>,
    settings: HashMap<(String, SettingKey), f64>,
}

/// Record store holding everything in process memory
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: Mutex<Collections>,
    next_id: AtomicI64,
    offline: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `StoreError::Unavailable`
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn intake_count(&self) -> usize {
        self.collections.lock().map(|c| c.intake.len()).unwrap_or(0)
    }

    pub fn weight_count(&self) -> usize {
        self.collections.lock().map(|c| c.weights.len()).unwrap_or(0)
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Collections>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("record store is offline".into()));
        }
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("record store lock poisoned".into()))
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_intake(&self, data: &IntakeCreate) -> StoreResult<IntakeRecord> {
        let mut collections = self.lock()?;
        let record = IntakeRecord {
            id: self.next_id(),
            user_id: data.user_id.clone(),
            protein: data.grams.protein,
            carbohydrate: data.grams.carbohydrate,
            fat: data.grams.fat,
            alcohol: data.grams.alcohol,
            created: data.created,
        };
        collections.intake.push(record.clone());
        Ok(record)
    }

    async fn list_intake(&self, filter: &RecordFilter) -> StoreResult<Vec<IntakeRecord>> {
        let collections = self.lock()?;
        let mut records: Vec<IntakeRecord> = collections
            .intake
            .iter()
            .filter(|r| r.user_id == filter.user_id && r.created >= filter.created_since)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.created, r.id));
        Ok(records)
    }

    async fn create_weight(&self, data: &WeightCreate) -> StoreResult<WeightSample> {
        let mut collections = self.lock()?;
        let sample = WeightSample {
            id: self.next_id(),
            user_id: data.user_id.clone(),
            weight_lbs: data.weight_lbs,
            created: data.created,
        };
        collections.weights.push(sample.clone());
        Ok(sample)
    }

    async fn list_weights(&self, filter: &RecordFilter) -> StoreResult<Vec<WeightSample>> {
        let collections = self.lock()?;
        let mut samples: Vec<WeightSample> = collections
            .weights
            .iter()
            .filter(|s| s.user_id == filter.user_id && s.created >= filter.created_since)
            .cloned()
            .collect();
        samples.sort_by_key(|s| (s.created, s.id));
        Ok(samples)
    }

    async fn upsert_setting(&self, user_id: &str, key: SettingKey, value: f64) -> StoreResult<()> {
        let mut collections = self.lock()?;
        collections.settings.insert((user_id.to_string(), key), value);
        Ok(())
    }

    async fn list_settings(&self, user_id: &str) -> StoreResult<Vec<(SettingKey, f64)>> {
        let collections = self.lock()?;
        Ok(SettingKey::ALL
            .iter()
            .filter_map(|k| {
                collections
                    .settings
                    .get(&(user_id.to_string(), *k))
                    .map(|v| (*k, *v))
            })
            .collect())
    }
}

/// Local store backed by a map
#[derive(Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("local store lock poisoned".into()))
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::MacroGrams;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_list_is_sorted_and_filtered() {
        let store = MemoryRecordStore::new();
        let now = Utc.with_ymd_and_hms(2026, 1, 16, 12, 0, 0).unwrap();

        for days_ago in [1, 10, 3] {
            store
                .create_intake(&IntakeCreate {
                    user_id: "u1".into(),
                    grams: MacroGrams::new(days_ago as f64, 0.0, 0.0, 0.0),
                    created: now - Duration::days(days_ago),
                })
                .await
                .unwrap();
        }

        let records = store
            .list_intake(&RecordFilter::new("u1", now - Duration::days(7)))
            .await
            .unwrap();
        let order: Vec<f64> = records.iter().map(|r| r.protein).collect();
        assert_eq!(order, vec![3.0, 1.0]);
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let store = MemoryRecordStore::new();
        store.set_offline(true);

        let err = store.list_settings("u1").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_offline(false);
        assert!(store.list_settings("u1").await.unwrap().is_empty());
    }
}
