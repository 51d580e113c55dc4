//! Stateless MCP method dispatch over a [`ToolRegistry`].

use serde_json::{json, Value};

use super::types::{
    CallToolParams, CallToolResult, Implementation, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, RequestId, ToolInfo, JSONRPC_VERSION,
};
use crate::registry::ToolRegistry;
use crate::tool::ToolError;

/// Protocol revisions this server can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Latest supported protocol revision.
pub const LATEST_PROTOCOL_VERSION: &str = SUPPORTED_PROTOCOL_VERSIONS[0];

/// Outcome of dispatching one message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A response to send back to the client.
    Response(JsonRpcResponse),
    /// The message was a notification; nothing to send.
    Accepted,
}

/// Dispatches JSON-RPC messages to the registry.
///
/// Holds no per-session state: every call is self-contained, so a single
/// handler can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct McpHandler {
    registry: ToolRegistry,
    server_info: Implementation,
    instructions: Option<String>,
}

impl McpHandler {
    pub fn new(registry: ToolRegistry, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            registry,
            server_info: Implementation {
                name: name.into(),
                version: version.into(),
            },
            instructions: None,
        }
    }

    /// Instructions returned to clients in the `initialize` result.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn server_info(&self) -> &Implementation {
        &self.server_info
    }

    /// Parse and dispatch a raw request body.
    pub async fn handle_bytes(&self, body: &[u8]) -> Dispatch {
        let value: Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(_) => {
                return Dispatch::Response(JsonRpcResponse::failure(
                    RequestId::Null,
                    JsonRpcError::parse_error(),
                ))
            }
        };
        self.handle_value(value).await
    }

    /// Dispatch an already parsed message.
    pub async fn handle_value(&self, value: Value) -> Dispatch {
        let id = value
            .get("id")
            .cloned()
            .and_then(|v| serde_json::from_value::<RequestId>(v).ok())
            .unwrap_or(RequestId::Null);

        if !value.is_object() {
            return Dispatch::Response(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request("Expected a single JSON-RPC message object"),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                return Dispatch::Response(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ))
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Dispatch::Response(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        self.handle(request).await
    }

    /// Dispatch one typed request.
    pub async fn handle(&self, request: JsonRpcRequest) -> Dispatch {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "notification accepted");
            return Dispatch::Accepted;
        };

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Dispatch::Response(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = negotiate_protocol_version(requested);

        let mut result = json!({
            "protocolVersion": version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": self.server_info,
        });
        if let Some(instructions) = &self.instructions {
            result["instructions"] = json!(instructions);
        }
        result
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<ToolInfo> = self
            .registry
            .descriptors()
            .map(|d| ToolInfo {
                name: d.name.clone(),
                description: d.description.clone(),
                input_schema: self
                    .registry
                    .input_schema(&d.name)
                    .unwrap_or_else(|| json!({ "type": "object" })),
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| JsonRpcError::invalid_params("Missing params for tools/call"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
            })?;

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let outcome = self
            .registry
            .call(&params.name, arguments)
            .await
            .ok_or_else(|| JsonRpcError::invalid_params(format!("Unknown tool: {}", params.name)))?;

        let result = match outcome {
            Ok(result) => CallToolResult::text(result.as_text()),
            Err(e @ ToolError::InvalidInput(_)) => {
                return Err(JsonRpcError::invalid_params(e.to_string()))
            }
            Err(e) => {
                tracing::debug!(tool = %params.name, error = %e, "tool returned an error");
                CallToolResult::error(e.to_string())
            }
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal(e.to_string()))
    }
}

/// Echo the client's version when supported, otherwise offer the latest.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|r| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|v| **v == r))
        .copied()
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
