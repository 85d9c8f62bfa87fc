use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::{
    connectors::youtube::ErrorResponse, utils::json_text_result, ConnectorError, ProviderRegistry,
};
use rmcp::model::*;

pub const SERVER_NAME: &str = "youtube-transcript";

/// MCP Server implementation that wraps the ProviderRegistry
pub struct McpServer {
    registry: Arc<Mutex<ProviderRegistry>>,
}

impl McpServer {
    pub fn new(registry: Arc<Mutex<ProviderRegistry>>) -> Self {
        Self { registry }
    }

    /// Get aggregated capabilities from all connectors
    pub async fn get_capabilities(&self) -> ServerCapabilities {
        let registry = self.registry.lock().await;
        let mut capabilities = ServerCapabilities::default();

        for (_name, connector) in registry.providers.iter() {
            let conn = connector.lock().await;
            let conn_caps = conn.capabilities().await;
            if conn_caps.tools.is_some() {
                capabilities.tools = conn_caps.tools;
            }
        }

        capabilities
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: InitializeRequestParam,
    ) -> Result<InitializeResult, ConnectorError> {
        info!(client = %request.client_info.name, "MCP Server initializing");

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.get_capabilities().await,
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Extracts transcripts from YouTube videos given a URL or video ID, as timed segments or plain text."
                    .to_string(),
            ),
        })
    }

    /// Handle list_tools request - aggregates from all connectors
    pub async fn handle_list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError> {
        let registry = self.registry.lock().await;

        Ok(ListToolsResult {
            tools: registry.get_provider_tools().await,
            next_cursor: None,
        })
    }

    /// Handle call_tool request - routes to the connector advertising the tool.
    ///
    /// Tool-level failures never surface as JSON-RPC errors; they are
    /// reported inside the text payload.
    pub async fn handle_call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError> {
        let registry = self.registry.lock().await;

        let Some(owner) = self.find_tool_owner(&registry, &request.name).await else {
            debug!(tool = %request.name, "No connector provides tool");
            return json_text_result(&ErrorResponse::unknown_tool(&request.name));
        };

        let connector = match registry.get_provider(&owner) {
            Some(connector) => connector.clone(),
            None => return json_text_result(&ErrorResponse::unknown_tool(&request.name)),
        };
        drop(registry);

        let c = connector.lock().await;
        match c.call_tool(request.clone()).await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Error in {}: {}", request.name, e);
                json_text_result(&ErrorResponse::server_error(e))
            }
        }
    }

    async fn find_tool_owner(&self, registry: &ProviderRegistry, tool: &str) -> Option<String> {
        for (name, connector) in registry.providers.iter() {
            let c = connector.lock().await;
            if let Ok(response) = c.list_tools(None).await {
                if response.tools.iter().any(|t| t.name == tool) {
                    return Some(name.clone());
                }
            }
        }
        None
    }
}

/// JSON-RPC handler for MCP protocol
pub struct JsonRpcHandler {
    server: McpServer,
}

impl JsonRpcHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    /// Process a JSON-RPC message and return the response, if one is due.
    ///
    /// Notifications (no `id`) get no response.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        debug!("Handling JSON-RPC request: {:?}", request);

        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let params = request.get("params").cloned().unwrap_or(json!({}));

        let Some(id) = request.get("id").cloned() else {
            debug!(method = %method, "Received notification");
            return None;
        };

        let result = match method {
            "initialize" => match serde_json::from_value::<InitializeRequestParam>(params) {
                Ok(req) => self
                    .server
                    .handle_initialize(req)
                    .await
                    .and_then(|r| serde_json::to_value(r).map_err(ConnectorError::SerdeJson))
                    .map_err(|e| e.to_jsonrpc_error()),
                Err(e) => Err(ConnectorError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            "ping" => Ok(json!({})),
            "tools/list" => match serde_json::from_value::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => self
                    .server
                    .handle_list_tools(req)
                    .await
                    .and_then(|r| serde_json::to_value(r).map_err(ConnectorError::SerdeJson))
                    .map_err(|e| e.to_jsonrpc_error()),
                Err(e) => Err(ConnectorError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            "tools/call" => match serde_json::from_value::<CallToolRequestParam>(params) {
                Ok(req) => self
                    .server
                    .handle_call_tool(req)
                    .await
                    .and_then(|r| serde_json::to_value(r).map_err(ConnectorError::SerdeJson))
                    .map_err(|e| e.to_jsonrpc_error()),
                Err(e) => Err(ConnectorError::InvalidParams(e.to_string()).to_jsonrpc_error()),
            },
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            _ => Err(ConnectorError::MethodNotFound.to_jsonrpc_error()),
        };

        Some(match result {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(error) => json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            }),
        })
    }
}
