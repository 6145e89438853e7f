//! Weight sample model
//!
//! Append-only bodyweight log in pounds.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::error::{TrackerError, TrackerResult};

/// Upper bound for a plausible bodyweight entry, in pounds
pub const MAX_WEIGHT_LBS: f64 = 1500.0;

/// A logged weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSample {
    pub id: i64,
    pub user_id: String,
    pub weight_lbs: f64,
    pub created: DateTime<Utc>,
}

/// Data for logging a weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightCreate {
    pub user_id: String,
    pub weight_lbs: f64,
    pub created: DateTime<Utc>,
}

/// Reject non-finite, non-positive and implausible weights
pub fn validate_weight(weight_lbs: f64) -> TrackerResult<f64> {
    if !weight_lbs.is_finite() {
        return Err(TrackerError::validation("Weight must be a number"));
    }
    if weight_lbs <= 0.0 {
        return Err(TrackerError::validation("Weight must be greater than 0"));
    }
    if weight_lbs >= MAX_WEIGHT_LBS {
        return Err(TrackerError::validation(format!(
            "Weight must be below {} lbs",
            MAX_WEIGHT_LBS
        )));
    }
    Ok(weight_lbs)
}

impl WeightSample {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            weight_lbs: row.get("weight_lbs")?,
            created: row.get("created")?,
        })
    }

    /// Create a new weight sample
    pub fn create(conn: &Connection, data: &WeightCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO weight_records (user_id, weight_lbs, created) VALUES (?1, ?2, ?3)",
            params![data.user_id, data.weight_lbs, data.created],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a weight sample by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weight_records WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(sample) => Ok(Some(sample)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's samples created at or after `since`, oldest first
    pub fn list_since(
        conn: &Connection,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM weight_records WHERE user_id = ?1 AND created >= ?2 ORDER BY created ASC, id ASC",
        )?;
        let samples = stmt
            .query_map(params![user_id, since], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(samples)
    }

    pub fn format_value(&self) -> String {
        format!("{:.1} lbs", self.weight_lbs)
    }
}
