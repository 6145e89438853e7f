//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INTAKE RECORDS
        -- One archived day of consumption, in grams.
        -- fat already includes the additional-fat surcharge.
        -- ============================================
        CREATE TABLE intake_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            protein REAL NOT NULL DEFAULT 0,
            carbohydrate REAL NOT NULL DEFAULT 0,
            fat REAL NOT NULL DEFAULT 0,
            alcohol REAL NOT NULL DEFAULT 0,
            created TEXT NOT NULL
        );

        CREATE INDEX idx_intake_user_created ON intake_records(user_id, created);

        -- ============================================
        -- WEIGHT RECORDS
        -- Append-only bodyweight log
        -- ============================================
        CREATE TABLE weight_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            weight_lbs REAL NOT NULL CHECK(weight_lbs > 0),
            created TEXT NOT NULL
        );

        CREATE INDEX idx_weight_user_created ON weight_records(user_id, created);

        -- ============================================
        -- SETTINGS
        -- Per-user numeric key/value pairs, upserted individually
        -- ============================================
        CREATE TABLE settings (
            user_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value REAL NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, key)
        );

        -- ============================================
        -- LOCAL STATE
        -- Session snapshots (today's servings, cached settings, pending archives)
        -- ============================================
        CREATE TABLE local_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }
}
