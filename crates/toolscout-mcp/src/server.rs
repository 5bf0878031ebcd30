//! Request dispatch for the toolscout MCP server.

use crate::error::{Result, ToolError};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
    ServerCapabilities, ServerInfo, JSONRPC_VERSION, PROTOCOL_VERSION,
};
use crate::tools::{default_tools, Tool, ToolContext};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolscout_analysis::{ScanOptions, ToolRegistry};
use toolscout_catalog::{source_from_config, SharedCatalog};
use toolscout_core::ToolscoutConfig;
use toolscout_recommend::{GeminiRecommender, RecommendationService};
use tracing::{debug, error, info, warn};

pub const SERVER_NAME: &str = "toolscout";

/// MCP server over the discovered tool registry.
pub struct McpServer {
    info: ServerInfo,
    tools: Vec<Arc<dyn Tool>>,
    ctx: ToolContext,
}

impl McpServer {
    pub fn new(ctx: ToolContext) -> Self {
        Self {
            info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            tools: default_tools(&ctx),
            ctx,
        }
    }

    /// Build the server from configuration and run the startup scan.
    ///
    /// A missing Gemini key or catalog is not fatal: recommendation calls
    /// then report the problem, and the catalog is skipped.
    pub async fn from_config(config: &ToolscoutConfig) -> Result<Self> {
        let registry = Arc::new(ToolRegistry::new(&ScanOptions::from(config.scan()))?);

        let recommender = match GeminiRecommender::new(config.recommend()) {
            Ok(gemini) => {
                let mut service = RecommendationService::new(Arc::new(gemini));
                if let Some(catalog) = build_catalog(config) {
                    service = service.with_catalog(catalog);
                }
                Ok(Arc::new(service))
            }
            Err(e) => {
                warn!("Recommendations disabled: {}", e);
                Err(e.to_string())
            }
        };

        let server = Self::new(ToolContext::new(registry, recommender));
        if let Some(root) = &config.scan().root {
            server.startup_scan(root).await;
        }
        Ok(server)
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.info
    }

    /// Scan `root` into the registry, logging each tool found.
    ///
    /// Failures are logged and leave the registry unchanged.
    pub async fn startup_scan(&self, root: &Path) {
        info!("Performing startup scan of {}", root.display());
        let registry = Arc::clone(self.ctx.registry());
        let root: PathBuf = root.to_path_buf();

        match tokio::task::spawn_blocking(move || registry.rescan(&root)).await {
            Ok(Ok(report)) => {
                info!("Startup scan found {} tools", report.table.len());
                for tool in report.table.iter() {
                    info!("  - {}: {}", tool.name, tool.description);
                }
            }
            Ok(Err(e)) => error!("Startup scan failed: {}", e),
            Err(e) => error!("Startup scan task failed: {}", e),
        }
    }

    /// Handle one raw message. Returns `None` when no reply is due.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<JsonRpcRequest>(message) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!("Failed to parse JSON-RPC request: {}", e);
                Some(JsonRpcResponse::parse_error(&e.to_string()))
            }
        }
    }

    /// Handle a parsed request. Notifications never get a reply.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("Handling request: {}", request.method);

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::invalid_request(
                request.id,
                "jsonrpc must be \"2.0\"",
            ));
        }

        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" => info!("Client initialized"),
                other => debug!("Ignoring notification: {}", other),
            }
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            method => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::method_not_found(request.id, method)
            }
        };
        Some(response)
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: self.info.clone(),
        };
        to_response(request.id, &result)
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = ListToolsResult {
            tools: self.tools.iter().map(|tool| tool.definition()).collect(),
        };
        to_response(request.id, &result)
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params = match request.params {
            Some(p) => match serde_json::from_value::<CallToolParams>(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::invalid_params(
                        request.id,
                        &format!("Invalid tool call params: {}", e),
                    );
                }
            },
            None => {
                return JsonRpcResponse::invalid_params(request.id, "Tool call params are required");
            }
        };

        let input = params.arguments.unwrap_or_else(|| json!({}));
        match self.call_tool(&params.name, input).await {
            Ok(result) => to_response(request.id, &result),
            Err(e) => {
                warn!("Tool '{}' failed: {}", params.name, e);
                JsonRpcResponse::error(request.id, e.into())
            }
        }
    }

    /// Run the named tool directly.
    pub async fn call_tool(&self, name: &str, input: Value) -> std::result::Result<CallToolResult, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(input).await
    }
}

fn build_catalog(config: &ToolscoutConfig) -> Option<Arc<SharedCatalog>> {
    match source_from_config(config.catalog()) {
        Ok(Some(source)) => {
            info!("Using tool catalog: {}", source.name());
            let catalog = Arc::new(SharedCatalog::new(source));
            let warm = Arc::clone(&catalog);
            tokio::spawn(async move {
                match warm.get().await {
                    Ok(table) => info!(
                        "Loaded {} catalog tools from {} toolkits",
                        table.len(),
                        table.toolkit_count()
                    ),
                    Err(e) => warn!("Catalog preload failed: {}", e),
                }
            });
            Some(catalog)
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Catalog disabled: {}", e);
            None
        }
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::internal_error(id, Some(format!("Failed to serialize result: {}", e))),
    }
}
