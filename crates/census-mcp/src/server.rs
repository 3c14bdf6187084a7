//! MCP server implementation.
//!
//! One `McpServer` holds the state of one client session:
//! 1. Initialize - exchange capabilities (once)
//! 2. Handle tool calls - execute tools via the handler
//! 3. Shutdown - on EOF (stdio) or when the event stream closes (SSE)

use std::sync::Arc;

use census_core::Result;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::handlers::ToolHandler;
use crate::protocol::{
    IncomingMessage, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, RequestId, ServerCapabilities, ServerInfo, ToolCallParams, ToolsCapability,
    ToolsListResult, MCP_VERSION, SERVER_NAME,
};
use crate::transport::{ReadOutcome, StdioTransport};

/// MCP server session.
pub struct McpServer {
    handler: Arc<ToolHandler>,
    initialized: bool,
}

impl McpServer {
    /// Create a new session backed by a shared tool handler.
    pub fn new(handler: Arc<ToolHandler>) -> Self {
        Self {
            handler,
            initialized: false,
        }
    }

    /// Whether `initialize` has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout until EOF.
    pub async fn run_stdio(&mut self) -> Result<()> {
        self.run(StdioTransport::stdio()).await
    }

    /// Serve on the given transport until EOF.
    pub async fn run(&mut self, mut transport: StdioTransport) -> Result<()> {
        info!(
            provider = self.handler.provider_name(),
            "Starting MCP server on stdio"
        );

        loop {
            let response = match transport.read_message() {
                Ok(ReadOutcome::Message(message)) => self.handle_message(message).await,
                Ok(ReadOutcome::Invalid(e)) => Some(JsonRpcResponse::error(RequestId::Null, e)),
                Ok(ReadOutcome::Empty) => None,
                Ok(ReadOutcome::Eof) => {
                    info!("EOF received, shutting down");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Transport read error");
                    break;
                }
            };

            if let Some(response) = response {
                if let Err(e) = transport.write_response(&response) {
                    error!(error = %e, "Failed to write response");
                    break;
                }
            }
        }

        info!("MCP server stopped");
        Ok(())
    }

    /// Handle an incoming message. Notifications get no response.
    pub async fn handle_message(&mut self, message: IncomingMessage) -> Option<JsonRpcResponse> {
        match message {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notification) => {
                self.handle_notification(&notification.method);
                None
            }
        }
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = req.method.as_str(), id = ?req.id, "Handling request");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req.id, req.params),
            "tools/list" => self.handle_tools_list(req.id),
            "tools/call" => self.handle_tools_call(req.id, req.params).await,
            "ping" => self.handle_ping(req.id),
            method => {
                warn!(method = method, "Unknown method");
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => {
                info!("Client initialized");
            }
            "notifications/cancelled" => {
                debug!("Request cancelled by client");
            }
            _ => {
                debug!(method = method, "Ignoring notification");
            }
        }
    }

    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(init) => info!(
                    client = init.client_info.name.as_str(),
                    client_version = init.client_info.version.as_str(),
                    protocol = init.protocol_version.as_str(),
                    "Client connected"
                ),
                Err(e) => warn!(error = %e, "Failed to parse initialize params"),
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.handler.available_tools(),
        };
        JsonRpcResponse::from_result(id, &result)
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params(&e.to_string()));
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        info!(tool = params.name.as_str(), "Calling tool");

        let result = self.handler.execute(&params.name, params.arguments).await;
        JsonRpcResponse::from_result(id, &result)
    }

    fn handle_ping(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::success(id, serde_json::json!({}))
    }
}
