//! Minimal MCP JSON-RPC layer.
//!
//! Only what a stateless tool server needs: `initialize`, `ping`,
//! `tools/list`, `tools/call` and fire-and-forget notifications. Transport
//! concerns (HTTP, status codes, CORS) live in the server crate.

mod handler;
pub mod types;

pub use handler::{
    negotiate_protocol_version, Dispatch, McpHandler, LATEST_PROTOCOL_VERSION,
    SUPPORTED_PROTOCOL_VERSIONS,
};
pub use types::{
    codes, CallToolResult, Content, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId,
};
