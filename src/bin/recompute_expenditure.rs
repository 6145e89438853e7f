//! Utility to recompute the calorie expenditure estimate once
//!
//! Usage: recompute_expenditure [window_days]

use std::sync::Arc;

use chrono::Utc;
use macrotrack::config::TrackerConfig;
use macrotrack::error::TrackerError;
use macrotrack::store::{SqliteLocalStore, SqliteRecordStore};
use macrotrack::tracker::Tracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env()?;

    let mut params = config.recompute_params();
    if let Some(arg) = std::env::args().nth(1) {
        params.window_days = arg
            .parse::<u32>()
            .ok()
            .filter(|days| *days >= 1)
            .ok_or_else(|| TrackerError::validation(format!("Invalid window_days: {}", arg)))?;
    }

    let db_path = config.database_path.clone();
    println!("Database: {}", db_path.display());

    let database = macrotrack::db::Database::new(&db_path)?;
    database.with_conn(macrotrack::db::migrations::run_migrations)?;

    let now = Utc::now();
    let tracker = Tracker::open(
        Arc::new(SqliteRecordStore::new(database.clone())),
        Arc::new(SqliteLocalStore::new(database)),
        config,
        now.date_naive(),
    )
    .await;

    let settings = tracker.settings().await;
    println!(
        "Current expenditure: {} kcal, target {} lb/week, window {} days",
        settings.calorie_expenditure, settings.delta_lb_per_week, params.window_days
    );

    match tracker.recompute_with(now, params).await {
        Ok(report) => {
            println!("  Weight entries:        {}", report.weight_samples);
            println!("  Intake records:        {}", report.intake_records);
            println!("  Trend slope:           {:.3} lb/day", report.slope);
            println!("  Regression difference: {:.2} lb", report.regression_difference);
            println!("  Intake calories:       {:.0}", report.intake_calories);
            println!("  Trend correction:      {:.1}", report.trend_correction);
            println!("  Intake deviation:      {:.1}", report.intake_deviation);
            println!("  Adjustment:            {:.1}", report.adjustment);
            println!(
                "  Applied step:          {:+.0}{}",
                report.applied_step,
                if report.capped { " (capped)" } else { "" }
            );
            println!(
                "New expenditure: {} kcal (was {})",
                report.new_expenditure, report.previous_expenditure
            );
        }
        Err(e) if e.is_insufficient_history() => {
            println!("Not enough data: {}", e);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
