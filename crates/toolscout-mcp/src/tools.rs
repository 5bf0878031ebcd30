//! The MCP tools exposed by the toolscout server.

use crate::error::ToolError;
use crate::protocol::{CallToolResult, ToolDefinition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use toolscout_analysis::{ScanReport, SkippedFile, ToolRegistry};
use toolscout_core::ToolSummary;
use toolscout_recommend::{RecommendationResponse, RecommendationService};
use tracing::{debug, info, warn};

/// State shared by every tool.
#[derive(Clone)]
pub struct ToolContext {
    registry: Arc<ToolRegistry>,
    recommender: Result<Arc<RecommendationService>, String>,
}

impl ToolContext {
    /// `recommender` carries the reason it could not be built when absent.
    pub fn new(
        registry: Arc<ToolRegistry>,
        recommender: Result<Arc<RecommendationService>, String>,
    ) -> Self {
        Self {
            registry,
            recommender,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

/// A callable MCP tool.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> Value;

    async fn execute(&self, input: Value) -> Result<CallToolResult, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// The full tool set, in listing order.
pub fn default_tools(ctx: &ToolContext) -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(RecommendToolsTool::new(ctx.clone())),
        Arc::new(ListToolsTool::new(ctx.clone())),
        Arc::new(ScanToolsDirectoryTool::new(ctx.clone())),
    ]
}

fn schema_of<T: JsonSchema>() -> Value {
    schemars::schema_for!(T).to_value()
}

fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, ToolError> {
    let value = serde_json::to_value(value).map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
    Ok(CallToolResult::json(&value))
}

// =============================================================================
// recommend_tools
// =============================================================================

pub struct RecommendToolsTool {
    ctx: ToolContext,
}

impl RecommendToolsTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecommendToolsInput {
    /// Description of what the user wants to do
    pub query_description: String,
    /// Number of top tools to consider
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    1
}

#[async_trait]
impl Tool for RecommendToolsTool {
    fn name(&self) -> &str {
        "recommend_tools"
    }

    fn description(&self) -> &str {
        "Find the most relevant discovered tool for a task description, decide whether it \
         can be updated or a new tool should be created, and suggest a matching catalog tool"
    }

    fn input_schema(&self) -> Value {
        schema_of::<RecommendToolsInput>()
    }

    async fn execute(&self, input: Value) -> Result<CallToolResult, ToolError> {
        let input: RecommendToolsInput = parse_input(input)?;
        info!("Recommending tools for: {}", input.query_description);

        let response = match &self.ctx.recommender {
            Ok(service) => {
                let tools = self.ctx.registry.snapshot();
                service
                    .recommend(&tools, &input.query_description, input.top_k)
                    .await
            }
            Err(reason) => RecommendationResponse::failure(format!(
                "LLM service initialization failed: {}",
                reason
            )),
        };
        json_result(&response)
    }
}

// =============================================================================
// list_tools
// =============================================================================

pub struct ListToolsTool {
    ctx: ToolContext,
}

impl ListToolsTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListToolsInput {}

#[derive(Debug, Serialize)]
pub struct ListToolsOutput {
    pub success: bool,
    pub total: usize,
    pub tools: Vec<ToolSummary>,
}

#[async_trait]
impl Tool for ListToolsTool {
    fn name(&self) -> &str {
        "list_tools"
    }

    fn description(&self) -> &str {
        "List every discovered tool with its description and schema names"
    }

    fn input_schema(&self) -> Value {
        schema_of::<ListToolsInput>()
    }

    async fn execute(&self, input: Value) -> Result<CallToolResult, ToolError> {
        let _: ListToolsInput = parse_input(input)?;
        let tools = self.ctx.registry.snapshot();
        debug!("Listing {} tools", tools.len());

        json_result(&ListToolsOutput {
            success: true,
            total: tools.len(),
            tools: tools.summaries(),
        })
    }
}

// =============================================================================
// scan_tools_directory
// =============================================================================

pub struct ScanToolsDirectoryTool {
    ctx: ToolContext,
}

impl ScanToolsDirectoryTool {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScanToolsDirectoryInput {
    /// Directory to scan recursively for tool classes
    pub directory_path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct ScanOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub directory: PathBuf,
    pub tools_found: usize,
    pub files_scanned: usize,
    pub skipped_files: Vec<SkippedFile>,
    pub tools: Vec<ToolSummary>,
}

impl ScanOutput {
    pub fn from_report(report: &ScanReport) -> Self {
        Self {
            success: true,
            error: None,
            directory: report.root.clone(),
            tools_found: report.table.len(),
            files_scanned: report.files_scanned,
            skipped_files: report.skipped.clone(),
            tools: report.table.summaries(),
        }
    }

    fn failure(directory: PathBuf, error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            directory,
            tools_found: 0,
            files_scanned: 0,
            skipped_files: Vec::new(),
            tools: Vec::new(),
        }
    }
}

#[async_trait]
impl Tool for ScanToolsDirectoryTool {
    fn name(&self) -> &str {
        "scan_tools_directory"
    }

    fn description(&self) -> &str {
        "Scan a directory for Python tool classes and replace the set of discovered tools"
    }

    fn input_schema(&self) -> Value {
        schema_of::<ScanToolsDirectoryInput>()
    }

    async fn execute(&self, input: Value) -> Result<CallToolResult, ToolError> {
        let input: ScanToolsDirectoryInput = parse_input(input)?;
        let directory = input.directory_path;
        info!("Scanning tools directory: {}", directory.display());

        let registry = Arc::clone(&self.ctx.registry);
        let root = directory.clone();
        let outcome = tokio::task::spawn_blocking(move || registry.rescan(&root))
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("scan task failed: {}", e)))?;

        let output = match outcome {
            Ok(report) => ScanOutput::from_report(&report),
            Err(e) => {
                warn!("Scan of {} failed: {}", directory.display(), e);
                ScanOutput::failure(directory, e.to_string())
            }
        };
        json_result(&output)
    }
}
