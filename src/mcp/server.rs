//! Macrotrack MCP Server Implementation
//!
//! Implements the MCP server with all macrotrack tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::models::SettingsUpdate;
use crate::tools::expenditure;
use crate::tools::intake;
use crate::tools::servings;
use crate::tools::settings;
use crate::tools::status::StatusTracker;
use crate::tools::weight;
use crate::tracker::Tracker;

/// Macrotrack MCP Service
#[derive(Clone)]
pub struct MacrotrackService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    tracker: Arc<Tracker>,
    tool_router: ToolRouter<MacrotrackService>,
}

impl MacrotrackService {
    pub fn new(database_path: PathBuf, tracker: Arc<Tracker>) -> Self {
        let config = tracker.config();
        let status = StatusTracker::new(database_path, config.user_id.clone(), config.window_days);
        Self {
            status_tracker: Arc::new(Mutex::new(status)),
            tracker,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MacroParams {
    /// Macro to change: protein, carbs, fat or alcohol
    #[serde(rename = "macro")]
    pub macro_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogWeightParams {
    /// Bodyweight in pounds
    pub weight_lbs: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HistoryParams {
    /// Trailing window in days (default 7)
    #[serde(default = "default_history_days")]
    pub days: u32,
}

fn default_history_days() -> u32 {
    7
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateSettingsParams {
    /// Daily protein target in servings
    pub protein_servings: Option<f64>,
    /// Daily carbohydrate target in servings
    pub carbohydrate_servings: Option<f64>,
    /// Daily fat target in servings
    pub fat_servings: Option<f64>,
    /// Daily alcohol target in servings
    pub alcohol_servings: Option<f64>,
    /// Share of protein and carb grams counted as extra fat, 0-100 (default 15)
    pub additional_fat_percent: Option<f64>,
    /// Estimated daily calorie expenditure (TDEE)
    pub calorie_expenditure: Option<f64>,
    /// Target rate of change in lbs per week, negative to lose
    pub delta_lb_per_week: Option<f64>,
}

impl From<UpdateSettingsParams> for SettingsUpdate {
    fn from(p: UpdateSettingsParams) -> Self {
        SettingsUpdate {
            protein_servings: p.protein_servings,
            carbohydrate_servings: p.carbohydrate_servings,
            fat_servings: p.fat_servings,
            alcohol_servings: p.alcohol_servings,
            additional_fat_percent: p.additional_fat_percent,
            calorie_expenditure: p.calorie_expenditure,
            delta_lb_per_week: p.delta_lb_per_week,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecomputeExpenditureParams {
    /// Trailing window in days (defaults to the configured window)
    pub window_days: Option<u32>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MacrotrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the macrotrack service including build info, database status, and process information")]
    async fn macrotrack_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        to_json(&status)
    }

    #[tool(description = "Get instructions for tracking macro servings, weight and expenditure. Call this when starting a tracking session or when unsure how the tools fit together.")]
    fn tracker_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::TRACKER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(TRACKER_INSTRUCTIONS)]))
    }

    // --- Servings ---

    #[tool(description = "Get today's servings, grams, calories, targets and remaining calories. Archives yesterday first if the day has changed.")]
    async fn get_today(&self) -> Result<CallToolResult, McpError> {
        let result = servings::get_today(&self.tracker, Utc::now()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add one serving of a macro (protein, carbs, fat or alcohol)")]
    async fn increment_macro(&self, Parameters(p): Parameters<MacroParams>) -> Result<CallToolResult, McpError> {
        let result = servings::increment_macro(&self.tracker, &p.macro_name, Utc::now()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove one serving of a macro (never goes below zero)")]
    async fn decrement_macro(&self, Parameters(p): Parameters<MacroParams>) -> Result<CallToolResult, McpError> {
        let result = servings::decrement_macro(&self.tracker, &p.macro_name, Utc::now()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Archive today's servings as an intake record and clear them. Servings are kept if the archive cannot be saved.")]
    async fn reset_daily(&self) -> Result<CallToolResult, McpError> {
        let result = servings::reset_daily(&self.tracker, Utc::now()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Retry archiving finished days that could not be saved when the day rolled over")]
    async fn sync_pending(&self) -> Result<CallToolResult, McpError> {
        let result = servings::sync_pending(&self.tracker).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Weight ---

    #[tool(description = "Log a bodyweight entry in pounds")]
    async fn log_weight(&self, Parameters(p): Parameters<LogWeightParams>) -> Result<CallToolResult, McpError> {
        let result = weight::log_weight(&self.tracker, p.weight_lbs, Utc::now()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List weight entries in the trailing window with the fitted trend in lbs per week")]
    async fn list_weights(&self, Parameters(p): Parameters<HistoryParams>) -> Result<CallToolResult, McpError> {
        let result = weight::list_weights(&self.tracker, p.days, Utc::now()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Intake ---

    #[tool(description = "List archived intake records in the trailing window with calories per record and the window total")]
    async fn list_intake(&self, Parameters(p): Parameters<HistoryParams>) -> Result<CallToolResult, McpError> {
        let result = intake::list_intake(&self.tracker, p.days, Utc::now()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Settings ---

    #[tool(description = "Get targets, additional fat percent, calorie expenditure and target rate of change")]
    async fn get_settings(&self) -> Result<CallToolResult, McpError> {
        let result = settings::get_settings(&self.tracker).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update one or more settings. All values are validated before anything is saved.")]
    async fn update_settings(&self, Parameters(p): Parameters<UpdateSettingsParams>) -> Result<CallToolResult, McpError> {
        let result = settings::update_settings(&self.tracker, p.into()).await
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Expenditure ---

    #[tool(description = "Recompute the calorie expenditure estimate from the weight trend and archived intake. Reports status applied, insufficient_data, failed or busy.")]
    async fn recompute_expenditure(&self, Parameters(p): Parameters<RecomputeExpenditureParams>) -> Result<CallToolResult, McpError> {
        let result = expenditure::recompute_expenditure(&self.tracker, p.window_days, Utc::now()).await;
        to_json(&result)
    }

    #[tool(description = "Get the state of the last expenditure recompute")]
    async fn recompute_status(&self) -> Result<CallToolResult, McpError> {
        let result = expenditure::recompute_status(&self.tracker).await;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MacrotrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macrotrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Macrotrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Macrotrack - macro serving counter with an adaptive calorie expenditure estimate. \
                 IMPORTANT: Call tracker_instructions before a tracking session. \
                 Servings: get_today, increment_macro/decrement_macro, reset_daily, sync_pending. \
                 Weight: log_weight, list_weights. Intake: list_intake. \
                 Settings: get_settings, update_settings. \
                 Expenditure: recompute_expenditure, recompute_status."
                    .into(),
            ),
        }
    }
}
