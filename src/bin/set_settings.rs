//! Utility to set tracker settings in the database
//!
//! Usage: set_settings key=value [key=value ...]
//! Keys: protein_servings, carbohydrate_servings, fat_servings,
//! alcohol_servings, additional_fat_percent, calorie_expenditure,
//! delta_lb_per_week

use std::sync::Arc;

use chrono::Utc;
use macrotrack::config::TrackerConfig;
use macrotrack::error::TrackerError;
use macrotrack::models::{SettingKey, SettingsUpdate};
use macrotrack::store::{SqliteLocalStore, SqliteRecordStore};
use macrotrack::tracker::Tracker;

fn parse_args(args: &[String]) -> Result<SettingsUpdate, TrackerError> {
    let mut update = SettingsUpdate::default();

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| TrackerError::validation(format!("Expected key=value, got '{}'", arg)))?;
        let key = SettingKey::from_str(key)
            .ok_or_else(|| TrackerError::validation(format!("Unknown setting '{}'", key)))?;
        let value: f64 = value.trim().parse().map_err(|_| {
            TrackerError::validation(format!("{} must be a number, got '{}'", key.as_str(), value))
        })?;
        update.set(key, value);
    }

    Ok(update)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("Usage: set_settings key=value [key=value ...]");
        for key in SettingKey::ALL {
            println!("  {}", key.as_str());
        }
        return Ok(());
    }
    let update = parse_args(&args)?;

    let config = TrackerConfig::from_env()?;
    let db_path = config.database_path.clone();
    println!("Database path: {}", db_path.display());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = macrotrack::db::Database::new(&db_path)?;
    database.with_conn(macrotrack::db::migrations::run_migrations)?;

    let tracker = Tracker::open(
        Arc::new(SqliteRecordStore::new(database.clone())),
        Arc::new(SqliteLocalStore::new(database)),
        config,
        Utc::now().date_naive(),
    )
    .await;

    let settings = tracker.update_settings(&update).await?;
    println!("Settings saved:");
    for (key, value) in settings.entries() {
        println!("  {}: {}", key.as_str(), value);
    }

    Ok(())
}
