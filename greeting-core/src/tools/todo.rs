//! In-memory todo tools.
//!
//! All five tools share one [`TodoStore`]. Reads require `todo:read`,
//! mutations require `todo:write`. Items live for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::tool::{Tool, ToolError, ToolResult};

const READ_SCOPES: &[&str] = &["todo:read"];
const WRITE_SCOPES: &[&str] = &["todo:write"];

/// A single todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Shared, thread-safe todo storage.
#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    items: Arc<RwLock<HashMap<String, TodoItem>>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, title: String, description: Option<String>) -> TodoItem {
        let item = TodoItem {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            completed: false,
            created_at: Utc::now(),
        };
        self.items.write().insert(item.id.clone(), item.clone());
        item
    }

    /// Items ordered by creation time, optionally filtered by completion.
    pub fn list(&self, completed: Option<bool>) -> Vec<TodoItem> {
        let mut items: Vec<TodoItem> = self
            .items
            .read()
            .values()
            .filter(|t| completed.map_or(true, |c| t.completed == c))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        items
    }

    pub fn get(&self, id: &str) -> Option<TodoItem> {
        self.items.read().get(id).cloned()
    }

    /// Apply the provided fields; `None` leaves a field untouched.
    pub fn update(
        &self,
        id: &str,
        title: Option<String>,
        description: Option<String>,
        completed: Option<bool>,
    ) -> Option<TodoItem> {
        let mut items = self.items.write();
        let item = items.get_mut(id)?;
        if let Some(title) = title {
            item.title = title;
        }
        if let Some(description) = description {
            item.description = Some(description);
        }
        if let Some(completed) = completed {
            item.completed = completed;
        }
        Some(item.clone())
    }

    pub fn delete(&self, id: &str) -> Option<TodoItem> {
        self.items.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

fn not_found(id: &str) -> ToolError {
    ToolError::NotFound(format!("Todo `{}` not found.", id))
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTodoInput {
    /// Short title of the todo
    pub title: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
}

/// Create a new todo item.
#[derive(Debug, Clone)]
pub struct CreateTodo {
    store: TodoStore,
}

impl CreateTodo {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

impl Tool for CreateTodo {
    type Input = CreateTodoInput;

    fn name(&self) -> &str {
        "create_todo"
    }

    fn description(&self) -> &str {
        "Create a new todo item."
    }

    fn required_scopes(&self) -> &[&str] {
        WRITE_SCOPES
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        if input.title.trim().is_empty() {
            return Err(ToolError::InvalidInput("Title is required".to_string()));
        }
        let todo = self.store.create(input.title, input.description);
        Ok(ToolResult::json(json!({ "todo": todo }))?)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTodosInput {
    /// Only return todos with this completion state
    #[serde(default)]
    pub completed: Option<bool>,
}

/// List todos, optionally filtered by completion state.
#[derive(Debug, Clone)]
pub struct ListTodos {
    store: TodoStore,
}

impl ListTodos {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

impl Tool for ListTodos {
    type Input = ListTodosInput;

    fn name(&self) -> &str {
        "list_todos"
    }

    fn description(&self) -> &str {
        "List all todos, optionally filtering by completion state."
    }

    fn required_scopes(&self) -> &[&str] {
        READ_SCOPES
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let todos = self.store.list(input.completed);
        Ok(ToolResult::json(json!({ "todos": todos }))?)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TodoIdInput {
    /// Identifier returned by `create_todo`
    pub todo_id: String,
}

/// Fetch a single todo by id.
#[derive(Debug, Clone)]
pub struct GetTodo {
    store: TodoStore,
}

impl GetTodo {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

impl Tool for GetTodo {
    type Input = TodoIdInput;

    fn name(&self) -> &str {
        "get_todo"
    }

    fn description(&self) -> &str {
        "Fetch a single todo by its identifier."
    }

    fn required_scopes(&self) -> &[&str] {
        READ_SCOPES
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let todo = self
            .store
            .get(&input.todo_id)
            .ok_or_else(|| not_found(&input.todo_id))?;
        Ok(ToolResult::json(json!({ "todo": todo }))?)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateTodoInput {
    /// Identifier of the todo to update
    pub todo_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Update fields on an existing todo.
#[derive(Debug, Clone)]
pub struct UpdateTodo {
    store: TodoStore,
}

impl UpdateTodo {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

impl Tool for UpdateTodo {
    type Input = UpdateTodoInput;

    fn name(&self) -> &str {
        "update_todo"
    }

    fn description(&self) -> &str {
        "Update fields on an existing todo."
    }

    fn required_scopes(&self) -> &[&str] {
        WRITE_SCOPES
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        let todo = self
            .store
            .update(
                &input.todo_id,
                input.title,
                input.description,
                input.completed,
            )
            .ok_or_else(|| not_found(&input.todo_id))?;
        Ok(ToolResult::json(json!({ "todo": todo }))?)
    }
}

/// Remove a todo from the store.
#[derive(Debug, Clone)]
pub struct DeleteTodo {
    store: TodoStore,
}

impl DeleteTodo {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }
}

impl Tool for DeleteTodo {
    type Input = TodoIdInput;

    fn name(&self) -> &str {
        "delete_todo"
    }

    fn description(&self) -> &str {
        "Remove a todo from the store."
    }

    fn required_scopes(&self) -> &[&str] {
        WRITE_SCOPES
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        self.store
            .delete(&input.todo_id)
            .ok_or_else(|| not_found(&input.todo_id))?;
        Ok(ToolResult::json(json!({ "deleted": input.todo_id }))?)
    }
}

/// All todo tools bound to one shared store, boxed for registration.
pub fn todo_tools(store: &TodoStore) -> Vec<Box<dyn crate::tool::DynTool>> {
    crate::box_tools![
        CreateTodo::new(store.clone()),
        ListTodos::new(store.clone()),
        GetTodo::new(store.clone()),
        UpdateTodo::new(store.clone()),
        DeleteTodo::new(store.clone()),
    ]
}

#[cfg(test)]
#[path = "todo_tests.rs"]
mod tests;
