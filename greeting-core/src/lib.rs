//! # Greeting MCP core
//!
//! Tool abstractions, the operation registry, the bundled tools and a
//! stateless MCP JSON-RPC dispatcher. HTTP hosting and authorization live in
//! `greeting-server`.
//!
//! ## Quick Start
//!
//! ```rust
//! use greeting_core::rpc::{Dispatch, McpHandler};
//! use greeting_core::tools::GreetUser;
//! use greeting_core::ToolRegistry;
//!
//! # tokio_test::block_on(async {
//! let registry = ToolRegistry::builder().tool(GreetUser).build().unwrap();
//! let handler = McpHandler::new(registry, "Greeting MCP", "1.0.0");
//!
//! let body = br#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"greet_user","arguments":{"name":"Ada"}}}"#;
//! let Dispatch::Response(response) = handler.handle_bytes(body).await else { unreachable!() };
//! assert_eq!(response.result.unwrap()["content"][0]["text"], "Hi Ada");
//! # });
//! ```

pub mod registry;
pub mod rpc;
pub mod tool;
pub mod tools;

pub use registry::{OperationDescriptor, RegistryError, ToolRegistry, ToolRegistryBuilder};
pub use tool::{box_tool, DynTool, Tool, ToolError, ToolResult};
