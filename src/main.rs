//! Macrotrack
//!
//! An MCP server for macro serving tracking with an adaptive expenditure
//! estimate.

use std::sync::Arc;

use chrono::Utc;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use macrotrack::build_info;
use macrotrack::config::TrackerConfig;
use macrotrack::db;
use macrotrack::mcp::MacrotrackService;
use macrotrack::store::{SqliteLocalStore, SqliteRecordStore};
use macrotrack::tracker::Tracker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("macrotrack=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = TrackerConfig::from_env()?;
    let db_path = config.database_path.clone();
    eprintln!("Database path: {}", db_path.display());

    // Ensure data directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    eprintln!("Initializing database...");
    let database = db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    // Open the tracker for today
    let tracker = Tracker::open(
        Arc::new(SqliteRecordStore::new(database.clone())),
        Arc::new(SqliteLocalStore::new(database)),
        config,
        Utc::now().date_naive(),
    )
    .await;

    // Create the macrotrack service
    let service = MacrotrackService::new(db_path, Arc::new(tracker));

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
