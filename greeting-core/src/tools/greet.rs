//! The `greet_user` tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::tool::{Tool, ToolError, ToolResult};

/// Input for [`GreetUser`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GreetInput {
    /// Name of the person to greet
    pub name: String,
}

/// Greets the caller by name. Requires the `usr:read` scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetUser;

impl Tool for GreetUser {
    type Input = GreetInput;

    fn name(&self) -> &str {
        "greet_user"
    }

    fn description(&self) -> &str {
        "Greets the user with a personalized message."
    }

    fn required_scopes(&self) -> &[&str] {
        &["usr:read"]
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        if input.name.is_empty() {
            return Err(ToolError::InvalidInput("Name is required".to_string()));
        }
        Ok(format!("Hi {}", input.name).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_greets_by_name() {
        let result = GreetUser
            .execute(GreetInput {
                name: "Ada".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(result.as_str(), Some("Hi Ada"));
    }

    #[tokio::test]
    async fn test_empty_name_is_invalid_input() {
        let err = GreetUser
            .execute(GreetInput {
                name: String::new(),
            })
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "Invalid input: Name is required");
    }

    #[test]
    fn test_declares_usr_read_scope() {
        assert_eq!(GreetUser.required_scopes(), &["usr:read"]);
    }

    #[test]
    fn test_schema_requires_name() {
        let schema = GreetUser.input_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "name"));
    }
}
