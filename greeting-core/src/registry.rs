//! Operation registry shared by the authorization gate and the RPC dispatcher.
//!
//! The registry is built once at startup and never mutated afterwards. The
//! gate consults it for [`OperationDescriptor::required_scopes`]; the
//! dispatcher uses it to list and execute tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::tool::{DynTool, Tool, ToolError, ToolResult};

/// Static description of one callable operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDescriptor {
    /// Operation name as used in `tools/call`.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Scopes a token must carry to call this operation. Order is kept as
    /// declared; duplicates are not removed.
    #[serde(rename = "requiredScopes")]
    pub required_scopes: Vec<String>,
}

/// Errors raised while assembling a registry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two tools were registered under the same name.
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// A tool was registered with an empty name.
    #[error("Tool names must not be empty")]
    EmptyName,
}

struct Entry {
    descriptor: OperationDescriptor,
    tool: Box<dyn DynTool>,
}

/// Immutable name → operation mapping.
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    entries: Arc<HashMap<String, Entry>>,
    order: Arc<Vec<String>>,
}

impl ToolRegistry {
    /// Start building a registry.
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Look up the descriptor for `name`.
    pub fn descriptor(&self, name: &str) -> Option<&OperationDescriptor> {
        self.entries.get(name).map(|e| &e.descriptor)
    }

    /// Scopes required by `name`, or `None` when the operation is unknown.
    pub fn required_scopes(&self, name: &str) -> Option<&[String]> {
        self.descriptor(name).map(|d| d.required_scopes.as_slice())
    }

    /// Input schema advertised for `name`.
    pub fn input_schema(&self, name: &str) -> Option<Value> {
        self.entries.get(name).map(|e| e.tool.input_schema())
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|e| &e.descriptor))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Execute the named tool with raw JSON arguments.
    ///
    /// Returns `None` when no tool with that name is registered.
    pub async fn call(&self, name: &str, arguments: Value) -> Option<Result<ToolResult, ToolError>> {
        let entry = self.entries.get(name)?;
        Some(entry.tool.execute_raw(arguments).await)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

/// Builder for [`ToolRegistry`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Box<dyn DynTool>>,
}

impl ToolRegistryBuilder {
    /// Register a single tool.
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(crate::tool::box_tool(tool));
        self
    }

    /// Register several already boxed tools (see [`crate::box_tools!`]).
    pub fn tools(mut self, tools: Vec<Box<dyn DynTool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Validate names and freeze the registry.
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut entries = HashMap::with_capacity(self.tools.len());
        let mut order = Vec::with_capacity(self.tools.len());

        for tool in self.tools {
            let name = tool.name().to_string();
            if name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if entries.contains_key(&name) {
                return Err(RegistryError::DuplicateTool(name));
            }

            let descriptor = OperationDescriptor {
                name: name.clone(),
                description: tool.description().to_string(),
                required_scopes: tool.required_scopes(),
            };
            order.push(name.clone());
            entries.insert(name, Entry { descriptor, tool });
        }

        Ok(ToolRegistry {
            entries: Arc::new(entries),
            order: Arc::new(order),
        })
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
