// src/lib.rs
pub mod auth;
pub mod config;
pub mod connectors;
pub mod error;
pub mod logging;
pub mod mcp_server;
pub mod transport;
pub mod utils;
use std::sync::Arc;

// Re-export types from rmcp that users of this library might need
pub use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeRequestParam,
    InitializeResult, ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities,
    Tool,
};

use crate::auth::AuthDetails;
use crate::config::ServerConfig;
pub use crate::error::ConnectorError;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the unique name of the connector.
    fn name(&self) -> &'static str;

    /// Returns a description of the connector.
    fn description(&self) -> &'static str;

    /// Returns the MCP capabilities of this connector.
    async fn capabilities(&self) -> ServerCapabilities;

    async fn list_tools(
        &self,
        request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, ConnectorError>;
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ConnectorError>;

    async fn get_auth_details(&self) -> Result<AuthDetails, ConnectorError>;
    async fn set_auth_details(&mut self, details: AuthDetails) -> Result<(), ConnectorError>;
}

pub struct ProviderRegistry {
    pub providers: HashMap<String, Arc<tokio::sync::Mutex<Box<dyn Connector>>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        ProviderRegistry {
            providers: HashMap::new(),
        }
    }

    pub fn register_provider(&mut self, provider: Box<dyn Connector>) {
        self.providers.insert(
            provider.name().to_string(),
            Arc::new(tokio::sync::Mutex::new(provider)),
        );
    }

    pub fn get_provider(&self, name: &str) -> Option<&Arc<tokio::sync::Mutex<Box<dyn Connector>>>> {
        self.providers.get(name)
    }

    pub fn list_providers(&self) -> Vec<ServerInfo> {
        let mut infos: Vec<ServerInfo> = self
            .providers
            .iter()
            .map(|(name, connector)| ServerInfo {
                name: name.clone(),
                description: connector
                    .try_lock()
                    .map(|c| c.description().to_string())
                    .unwrap_or_default(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// All tools from every registered connector, in connector-name order.
    pub async fn get_provider_tools(&self) -> Vec<Tool> {
        let mut names: Vec<&String> = self.providers.keys().collect();
        names.sort();

        let mut all_tools = Vec::new();
        for name in names {
            let c = self.providers[name].lock().await;
            match c.list_tools(None).await {
                Ok(response) => all_tools.extend(response.tools),
                Err(e) => tracing::error!("Error listing tools from connector {}: {}", name, e),
            }
        }
        all_tools
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a registry with every connector enabled via Cargo features,
/// configured from `config`.
pub async fn build_registry(config: &ServerConfig) -> Result<ProviderRegistry, ConnectorError> {
    #[allow(unused_mut)]
    let mut registry = ProviderRegistry::new();

    #[cfg(feature = "youtube")]
    {
        let connector =
            connectors::youtube::YouTubeConnector::new(Some(config.youtube_auth())).await?;
        registry.register_provider(Box::new(connector));
    }
    #[cfg(not(feature = "youtube"))]
    let _ = config;

    Ok(registry)
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub description: String,
}
