//! Intake record model
//!
//! One archived day of consumption in grams per macro. The `fat` column
//! already includes the additional-fat surcharge applied when the day's
//! servings were converted; readers must not apply it again.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{calories_from_grams, MacroGrams, ServingConfig};

/// A persisted intake snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub id: i64,
    pub user_id: String,
    pub protein: f64,
    pub carbohydrate: f64,
    pub fat: f64,
    pub alcohol: f64,
    pub created: DateTime<Utc>,
}

/// Data for creating an intake record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeCreate {
    pub user_id: String,
    pub grams: MacroGrams,
    pub created: DateTime<Utc>,
}

impl IntakeRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            protein: row.get("protein")?,
            carbohydrate: row.get("carbohydrate")?,
            fat: row.get("fat")?,
            alcohol: row.get("alcohol")?,
            created: row.get("created")?,
        })
    }

    pub fn grams(&self) -> MacroGrams {
        MacroGrams::new(self.protein, self.carbohydrate, self.fat, self.alcohol)
    }

    /// Calories for this record, surcharge already baked into `fat`
    pub fn calories(&self, config: &ServingConfig) -> f64 {
        calories_from_grams(&self.grams(), config)
    }

    /// Create a new intake record
    pub fn create(conn: &Connection, data: &IntakeCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO intake_records (user_id, protein, carbohydrate, fat, alcohol, created)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.user_id,
                data.grams.protein,
                data.grams.carbohydrate,
                data.grams.fat,
                data.grams.alcohol,
                data.created,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get an intake record by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM intake_records WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's records created at or after `since`, oldest first
    pub fn list_since(
        conn: &Connection,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM intake_records WHERE user_id = ?1 AND created >= ?2 ORDER BY created ASC, id ASC",
        )?;
        let records = stmt
            .query_map(params![user_id, since], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}
