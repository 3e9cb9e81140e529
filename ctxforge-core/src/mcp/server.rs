//! MCP Server Implementation
//!
//! The transport-facing layer: frames JSON-RPC requests, forwards tool calls
//! to the dispatcher, and publishes the command catalog. It owns no command
//! logic of its own.

use super::protocol::*;
use super::transport::Transport;
use crate::catalog::Command;
use crate::dispatch::Dispatcher;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

/// MCP Server configuration
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            name: "ctxforge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// MCP server over a command dispatcher
///
/// All mutations go through one lock, so each command runs to completion
/// before the next is admitted: the session/window cross-reference append is
/// atomic and visible before the call returns.
pub struct McpServer {
    config: McpServerConfig,
    dispatcher: Arc<RwLock<Dispatcher>>,
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("config", &self.config)
            .finish()
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

impl McpServer {
    /// Create a new MCP server builder
    pub fn builder() -> McpServerBuilder {
        McpServerBuilder::new()
    }

    /// Create a new MCP server with default config and a fresh store
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Handle an incoming JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, "handling request");

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "initialized" => {
                // Notification, no response needed but we return success
                JsonRpcResponse::success(request.id, Value::Null)
            }
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            "shutdown" => JsonRpcResponse::success(request.id, Value::Null),
            method => {
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: InitializeParams = match request.params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                    );
                }
            },
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = %client.version, "client connected");
        }

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
        };

        JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result).unwrap_or(Value::Null),
        )
    }

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        // The catalog is advertised verbatim; nothing is filtered or rewritten.
        let tools: Vec<McpTool> = Command::ALL
            .iter()
            .map(|command| McpTool {
                name: command.name().to_string(),
                description: command.description().to_string(),
                input_schema: command.input_schema(),
            })
            .collect();

        let result = ToolsListResult { tools };

        JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result).unwrap_or(Value::Null),
        )
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: ToolCallParams = match request.params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid tool call params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing tool call params"),
                );
            }
        };

        let reply = {
            let mut dispatcher = self.dispatcher.write().await;
            dispatcher.handle(&params.name, params.arguments)
        };

        let result = ToolCallResult {
            content: vec![ContentBlock::text(
                serde_json::to_string_pretty(&reply.payload).unwrap_or_default(),
            )],
            is_error: reply.is_error.then_some(true),
        };

        JsonRpcResponse::success(
            request.id,
            serde_json::to_value(result).unwrap_or(Value::Null),
        )
    }

    /// Run the server with a transport until the connection closes
    pub async fn run<T: Transport>(&self, mut transport: T) -> crate::error::Result<()> {
        loop {
            match transport.receive().await {
                Ok(Some(request)) => {
                    let response = self.handle_request(request).await;
                    transport.send(response).await?;
                }
                Ok(None) => {
                    // Connection closed
                    break;
                }
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Shared handle to the dispatcher (and through it, the store)
    pub fn dispatcher(&self) -> &Arc<RwLock<Dispatcher>> {
        &self.dispatcher
    }
}

/// Builder for MCP Server
pub struct McpServerBuilder {
    config: McpServerConfig,
    dispatcher: Dispatcher,
}

impl Default for McpServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl McpServerBuilder {
    pub fn new() -> Self {
        Self {
            config: McpServerConfig::default(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn build(self) -> McpServer {
        McpServer {
            config: self.config,
            dispatcher: Arc::new(RwLock::new(self.dispatcher)),
        }
    }
}
