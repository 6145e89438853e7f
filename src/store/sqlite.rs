//! SQLite-backed stores
//!
//! Blocking rusqlite calls are moved onto the blocking thread pool so the
//! async trait never stalls the runtime.

use async_trait::async_trait;

use super::{LocalStore, RecordFilter, RecordStore, StoreError, StoreResult};
use crate::db::{Database, DbResult};
use crate::models::{
    IntakeCreate, IntakeRecord, LocalEntry, SettingKey, SettingRecord, WeightCreate,
    WeightSample,
};

/// Record store over the tracker database
#[derive(Clone)]
pub struct SqliteRecordStore {
    database: Database,
}

impl SqliteRecordStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    async fn run<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let database = self.database.clone();
        tokio::task::spawn_blocking(move || database.with_conn(f))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create_intake(&self, data: &IntakeCreate) -> StoreResult<IntakeRecord> {
        let data = data.clone();
        self.run(move |conn| IntakeRecord::create(conn, &data)).await
    }

    async fn list_intake(&self, filter: &RecordFilter) -> StoreResult<Vec<IntakeRecord>> {
        let filter = filter.clone();
        self.run(move |conn| IntakeRecord::list_since(conn, &filter.user_id, filter.created_since))
            .await
    }

    async fn create_weight(&self, data: &WeightCreate) -> StoreResult<WeightSample> {
        let data = data.clone();
        self.run(move |conn| WeightSample::create(conn, &data)).await
    }

    async fn list_weights(&self, filter: &RecordFilter) -> StoreResult<Vec<WeightSample>> {
        let filter = filter.clone();
        self.run(move |conn| WeightSample::list_since(conn, &filter.user_id, filter.created_since))
            .await
    }

    async fn upsert_setting(&self, user_id: &str, key: SettingKey, value: f64) -> StoreResult<()> {
        let user_id = user_id.to_string();
        self.run(move |conn| SettingRecord::upsert(conn, &user_id, key, value))
            .await
    }

    async fn list_settings(&self, user_id: &str) -> StoreResult<Vec<(SettingKey, f64)>> {
        let user_id = user_id.to_string();
        self.run(move |conn| SettingRecord::list(conn, &user_id)).await
    }
}

/// Local key/value store over the same database
#[derive(Clone)]
pub struct SqliteLocalStore {
    database: Database,
}

impl SqliteLocalStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl LocalStore for SqliteLocalStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.database.with_conn(|conn| LocalEntry::get(conn, key))?)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        Ok(self.database.with_conn(|conn| LocalEntry::set(conn, key, value))?)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.database.with_conn(|conn| LocalEntry::remove(conn, key))?;
        Ok(())
    }
}
