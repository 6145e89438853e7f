//! Local state model
//!
//! Small JSON documents keyed by name: today's servings, cached settings and
//! archives waiting to be written to the intake store.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::servings::MacroServings;
use crate::db::DbResult;

pub const DAILY_SNAPSHOT_KEY: &str = "daily_servings";
pub const SETTINGS_CACHE_KEY: &str = "settings";
pub const PENDING_ARCHIVES_KEY: &str = "pending_archives";

/// Today's servings plus the day they belong to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub servings: MacroServings,
}

impl DailySnapshot {
    /// Timestamp used when this day is archived after it has ended
    pub fn archive_timestamp(&self) -> DateTime<Utc> {
        let noon = self.date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Utc.from_utc_datetime(&noon)
    }
}

/// Raw key/value rows
pub struct LocalEntry;

impl LocalEntry {
    pub fn get(conn: &Connection, key: &str) -> DbResult<Option<String>> {
        let mut stmt = conn.prepare("SELECT value FROM local_state WHERE key = ?1")?;

        match stmt.query_row([key], |row| row.get(0)) {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO local_state (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(conn: &Connection, key: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM local_state WHERE key = ?1", [key])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = DailySnapshot {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            servings: MacroServings::new(2.0, 3.0, 1.0, 0.0),
        };
        let json = serde_json::to_value(snapshot).unwrap();
        assert_eq!(json["date"], "2026-01-15");
        assert_eq!(json["protein"], 2.0);
        assert_eq!(json["alcohol"], 0.0);

        let parsed: DailySnapshot =
            serde_json::from_str(r#"{"date":"2026-01-15","protein":1}"#).unwrap();
        assert_eq!(parsed.servings, MacroServings::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_archive_timestamp_is_midday_utc() {
        let snapshot = DailySnapshot {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            servings: MacroServings::zero(),
        };
        assert_eq!(
            snapshot.archive_timestamp(),
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_get_set_remove() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(LocalEntry::get(&conn, "k").unwrap(), None);
        LocalEntry::set(&conn, "k", "one").unwrap();
        LocalEntry::set(&conn, "k", "two").unwrap();
        assert_eq!(LocalEntry::get(&conn, "k").unwrap().as_deref(), Some("two"));
        assert!(LocalEntry::remove(&conn, "k").unwrap());
        assert!(!LocalEntry::remove(&conn, "k").unwrap());
    }
}
