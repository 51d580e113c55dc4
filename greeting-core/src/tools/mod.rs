//! Tools bundled with the Greeting MCP server.

mod greet;
mod todo;

pub use greet::{GreetInput, GreetUser};
pub use todo::{
    todo_tools, CreateTodo, CreateTodoInput, DeleteTodo, GetTodo, ListTodos, ListTodosInput,
    TodoIdInput, TodoItem, TodoStore, UpdateTodo, UpdateTodoInput,
};
