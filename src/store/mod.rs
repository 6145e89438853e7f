//! Storage collaborators
//!
//! `RecordStore` is the remote side: intake, weight and settings collections
//! with create, filtered list and per-key upsert. `LocalStore` is the local
//! key/value side holding session snapshots. Both are injected into the
//! tracker so tests can swap in the in-memory versions.

mod memory;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::DbError;
use crate::models::{IntakeCreate, IntakeRecord, SettingKey, WeightCreate, WeightSample};

pub use memory::{MemoryLocalStore, MemoryRecordStore};
pub use sqlite::{SqliteLocalStore, SqliteRecordStore};

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Records belonging to `user_id` created at or after `created_since`.
/// Results are always sorted by creation time, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFilter {
    pub user_id: String,
    pub created_since: DateTime<Utc>,
}

impl RecordFilter {
    pub fn new(user_id: impl Into<String>, created_since: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            created_since,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_intake(&self, data: &IntakeCreate) -> StoreResult<IntakeRecord>;
    async fn list_intake(&self, filter: &RecordFilter) -> StoreResult<Vec<IntakeRecord>>;
    async fn create_weight(&self, data: &WeightCreate) -> StoreResult<WeightSample>;
    async fn list_weights(&self, filter: &RecordFilter) -> StoreResult<Vec<WeightSample>>;
    async fn upsert_setting(&self, user_id: &str, key: SettingKey, value: f64) -> StoreResult<()>;
    async fn list_settings(&self, user_id: &str) -> StoreResult<Vec<(SettingKey, f64)>>;
}

/// Synchronous key/value persistence for session state
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}
